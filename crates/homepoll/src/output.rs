//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use homepoll_core::{DeviceStatus, SinkEvent};

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single item. Table mode uses `detail_fn`, which returns
/// pre-formatted text.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a confirmation line, green when color is on.
pub fn print_ok(line: &str, color: bool, quiet: bool) {
    if color {
        print_output(&line.green().to_string(), quiet);
    } else {
        print_output(line, quiet);
    }
}

/// Two-column field/value table for detail views.
pub fn render_fields<'a>(fields: impl IntoIterator<Item = (&'a str, String)>) -> String {
    #[derive(Tabled)]
    struct FieldRow<'f> {
        #[tabled(rename = "Field")]
        field: &'f str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows: Vec<FieldRow<'_>> = fields
        .into_iter()
        .map(|(field, value)| FieldRow { field, value })
        .collect();
    render_table(&rows)
}

// ── Event stream (run) ───────────────────────────────────────────────

/// One line per published event. Structured formats emit one document
/// per event so the stream stays parseable.
pub fn render_event(format: OutputFormat, event: &SinkEvent, color: bool) -> String {
    match format {
        OutputFormat::Table | OutputFormat::Plain => render_event_line(event, color),
        OutputFormat::Json | OutputFormat::JsonCompact => render_json(event, true),
        OutputFormat::Yaml => format!("---\n{}", render_yaml(event).trim_end()),
    }
}

fn render_event_line(event: &SinkEvent, color: bool) -> String {
    match event {
        SinkEvent::State {
            device,
            channel,
            state,
        } => {
            let key = format!("{device}.{channel}");
            if color {
                format!("{} = {state}", key.cyan())
            } else {
                format!("{key} = {state}")
            }
        }
        SinkEvent::Status { device, status } => {
            let text = status.to_string();
            let text = if color {
                match status {
                    DeviceStatus::Online => text.green().to_string(),
                    DeviceStatus::Offline { .. } => text.red().to_string(),
                    DeviceStatus::Unknown => text.yellow().to_string(),
                }
            } else {
                text
            };
            format!("{device} is {text}")
        }
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}
