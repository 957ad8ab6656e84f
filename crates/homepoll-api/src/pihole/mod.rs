// Pi-hole admin API client
//
// Unauthenticated summary polling plus token-authenticated
// enable/disable of DNS blocking.

pub mod client;
pub mod models;

pub use client::{PiHoleClient, SummaryFormat};
pub use models::{PiHoleSummary, SUMMARY_FIELDS};
