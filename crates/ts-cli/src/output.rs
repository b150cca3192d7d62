//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use ts_core::PropertyOverlay;

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// One key/value line of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct Entry {
    /// Key.
    #[tabled(rename = "Key")]
    pub key: String,
    /// Value.
    #[tabled(rename = "Value")]
    pub value: String,
}

impl Entry {
    /// Creates an entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Renders rows in the requested format; `None` for quiet.
///
/// Formats without a row notion fall back to `key=value` lines of the
/// first two columns.
pub fn render<T: Tabled + Serialize>(
    data: &[T],
    format: OutputFormat,
) -> crate::CliResult<Option<String>> {
    let rendered = match format {
        OutputFormat::Table => Table::new(data).with(Style::rounded()).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Properties | OutputFormat::Env => data
            .iter()
            .map(|row| {
                let fields = row.fields();
                let key = fields.first().map(ToString::to_string).unwrap_or_default();
                let value = fields.get(1).map(ToString::to_string).unwrap_or_default();
                format!("{key}={value}\n")
            })
            .collect::<String>()
            .trim_end()
            .to_string(),
        OutputFormat::Quiet => return Ok(None),
    };
    Ok(Some(rendered))
}

/// Prints rows in the requested format.
pub fn output<T: Tabled + Serialize>(data: &[T], format: OutputFormat) -> crate::CliResult<()> {
    if data.is_empty() && format == OutputFormat::Table {
        info("No results found.");
        return Ok(());
    }
    if let Some(rendered) = render(data, format)? {
        println!("{rendered}");
    }
    Ok(())
}

/// Renders a property overlay; `None` for quiet.
pub fn render_overlay(
    overlay: &PropertyOverlay,
    format: OutputFormat,
) -> crate::CliResult<Option<String>> {
    let rendered = match format {
        OutputFormat::Table => {
            let rows: Vec<Entry> = overlay.iter().map(|(k, v)| Entry::new(k, v)).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => overlay.to_json()?,
        OutputFormat::Properties => overlay.to_properties().trim_end().to_string(),
        OutputFormat::Env => overlay.to_env().trim_end().to_string(),
        OutputFormat::Quiet => return Ok(None),
    };
    Ok(Some(rendered))
}

/// Prints a property overlay.
pub fn output_overlay(overlay: &PropertyOverlay, format: OutputFormat) -> crate::CliResult<()> {
    if let Some(rendered) = render_overlay(overlay, format)? {
        println!("{rendered}");
    }
    Ok(())
}
