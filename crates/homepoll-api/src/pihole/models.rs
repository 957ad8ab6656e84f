// Pi-hole admin API response types
//
// `admin/api.php?summary` renders counters as grouped strings ("12,345"),
// `?summaryRaw` as JSON numbers. Both shapes deserialize into the same
// struct: every counter is normalized to a separator-free numeric string
// and rejected if it still does not parse as a number.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::snapshot::SummarySnapshot;

/// Field names of a summary, in channel order.
pub const SUMMARY_FIELDS: [&str; 11] = [
    "status",
    "dns_queries_today",
    "domains_being_blocked",
    "ads_blocked_today",
    "ads_percentage_today",
    "unique_domains",
    "queries_forwarded",
    "queries_cached",
    "clients_ever_seen",
    "unique_clients",
    "privacy_level",
];

/// Validated `summary` / `summaryRaw` payload.
///
/// Every field is required; a payload missing any of them fails to
/// deserialize. Extra fields (`gravity_last_updated`, `reply_*`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiHoleSummary {
    /// `"enabled"`, `"disabled"`, or whatever the server reports.
    pub status: String,
    #[serde(deserialize_with = "counter")]
    pub dns_queries_today: String,
    #[serde(deserialize_with = "counter")]
    pub domains_being_blocked: String,
    #[serde(deserialize_with = "counter")]
    pub ads_blocked_today: String,
    #[serde(deserialize_with = "counter")]
    pub ads_percentage_today: String,
    #[serde(deserialize_with = "counter")]
    pub unique_domains: String,
    #[serde(deserialize_with = "counter")]
    pub queries_forwarded: String,
    #[serde(deserialize_with = "counter")]
    pub queries_cached: String,
    #[serde(deserialize_with = "counter")]
    pub clients_ever_seen: String,
    #[serde(deserialize_with = "counter")]
    pub unique_clients: String,
    #[serde(deserialize_with = "counter")]
    pub privacy_level: String,
}

impl PiHoleSummary {
    /// `Some(true)` for `"enabled"`, `Some(false)` for `"disabled"`.
    pub fn is_enabled(&self) -> Option<bool> {
        blocking_state(&self.status)
    }

    /// Every numeric field paired with its name.
    pub fn counters(&self) -> [(&'static str, &str); 10] {
        [
            ("dns_queries_today", &self.dns_queries_today),
            ("domains_being_blocked", &self.domains_being_blocked),
            ("ads_blocked_today", &self.ads_blocked_today),
            ("ads_percentage_today", &self.ads_percentage_today),
            ("unique_domains", &self.unique_domains),
            ("queries_forwarded", &self.queries_forwarded),
            ("queries_cached", &self.queries_cached),
            ("clients_ever_seen", &self.clients_ever_seen),
            ("unique_clients", &self.unique_clients),
            ("privacy_level", &self.privacy_level),
        ]
    }

    pub fn to_snapshot(&self) -> SummarySnapshot {
        SummarySnapshot::from_pairs(
            std::iter::once(("status", self.status.clone()))
                .chain(self.counters().into_iter().map(|(k, v)| (k, v.to_owned()))),
        )
    }
}

/// Response of `?enable` / `?disable`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Map a reported status string onto the blocking switch.
pub fn blocking_state(status: &str) -> Option<bool> {
    match status {
        "enabled" => Some(true),
        "disabled" => Some(false),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Leaf {
    Text(String),
    Number(serde_json::Number),
}

/// Accept a string or number, strip grouping separators, require a number.
fn counter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = match Leaf::deserialize(deserializer)? {
        Leaf::Text(s) => s,
        Leaf::Number(n) => n.to_string(),
    };
    let cleaned = strip_grouping(&raw);
    if cleaned.parse::<f64>().is_err() {
        return Err(de::Error::custom(format!("counter {raw:?} is not numeric")));
    }
    Ok(cleaned)
}

/// Remove thousands separators (`,` and spaces) from a rendered number.
pub fn strip_grouping(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}
