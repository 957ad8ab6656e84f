//! Pi-hole command handlers.

use homepoll_api::{PiHoleSummary, SummaryFormat};
use homepoll_core::PiHoleDevice;
use serde::Serialize;

use crate::cli::{GlobalOpts, PiholeArgs, PiholeCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct BlockingResult {
    status: String,
}

pub async fn handle(args: PiholeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (name, mut cfg) = config::pihole(global)?;
    tracing::debug!(device = %name, url = %cfg.url, "pihole command");

    match args.command {
        PiholeCommand::Summary { formatted } => {
            if formatted {
                cfg.summary_format = SummaryFormat::Formatted;
            }
            let device = PiHoleDevice::new(&cfg)?;
            let summary = device.client().fetch_summary().await?;
            let out = output::render_single(
                global.output,
                &summary,
                detail,
                |s: &PiHoleSummary| s.status.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PiholeCommand::Enable => {
            require_token(&cfg)?;
            let device = PiHoleDevice::new(&cfg)?;
            let status = device.client().enable().await?;
            print_blocking(global, status);
            Ok(())
        }

        PiholeCommand::Disable { seconds } => {
            require_token(&cfg)?;
            let device = PiHoleDevice::new(&cfg)?;
            let status = device.client().disable(seconds).await?;
            print_blocking(global, status);
            Ok(())
        }

        PiholeCommand::Ping => {
            let device = PiHoleDevice::new(&cfg)?;
            if !device.client().check_connectivity().await {
                return Err(CliError::Unreachable {
                    reason: format!("{} did not answer with HTTP 200", cfg.url),
                });
            }
            output::print_ok(
                &format!("{} is reachable", cfg.url),
                output::should_color(global.color),
                global.quiet,
            );
            Ok(())
        }
    }
}

fn require_token(cfg: &homepoll_core::PiHoleConfig) -> Result<(), CliError> {
    if cfg.token.is_none() {
        return Err(config::missing("token"));
    }
    Ok(())
}

fn detail(s: &PiHoleSummary) -> String {
    output::render_fields(
        std::iter::once(("status", s.status.clone()))
            .chain(s.counters().into_iter().map(|(k, v)| (k, v.to_owned()))),
    )
}

fn print_blocking(global: &GlobalOpts, status: String) {
    let result = BlockingResult { status };
    let out = output::render_single(
        global.output,
        &result,
        |r| format!("Blocking is now {}", r.status),
        |r| r.status.clone(),
    );
    output::print_output(&out, global.quiet);
}
