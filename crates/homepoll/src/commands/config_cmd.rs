//! Config command handlers. These never touch the network.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct DeviceSummary {
    name: String,
    kind: &'static str,
    url: String,
    default: bool,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

impl From<&DeviceSummary> for DeviceRow {
    fn from(d: &DeviceSummary) -> Self {
        Self {
            name: d.name.clone(),
            kind: d.kind,
            url: d.url.clone(),
            default: if d.default { "*" } else { "" },
        }
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::display_path(global), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let rendered = cfg.to_redacted_toml()?;
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Devices => {
            let cfg = config::load(global)?;
            let devices: Vec<DeviceSummary> = cfg
                .devices
                .iter()
                .map(|(name, entry)| DeviceSummary {
                    name: name.clone(),
                    kind: entry.kind(),
                    url: entry.connection().url.clone(),
                    default: cfg.default_device.as_deref() == Some(name.as_str()),
                })
                .collect();
            let out = output::render_list(global.output, &devices, |d| DeviceRow::from(d), |d| {
                d.name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
