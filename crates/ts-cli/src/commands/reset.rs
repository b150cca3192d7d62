//! Database reset command.

use ts_core::FixtureSpec;
use ts_postgres::{DatabaseResetCoordinator, ResetReport};

use crate::config::OutputFormat;
use crate::output::{output, success, Entry};

/// Display rows for a report.
#[must_use]
pub fn report_rows(report: &ResetReport) -> Vec<Entry> {
    let clean = if report.cleaned { "done" } else { "skipped" };
    let migrate = if report.migrated {
        format!("done ({} migrations)", report.migrations)
    } else {
        "skipped".to_string()
    };
    vec![Entry::new("clean", clean), Entry::new("migrate", migrate)]
}

/// Resets the database described by `spec`.
pub async fn reset_db(spec: &FixtureSpec) -> crate::CliResult<ResetReport> {
    let report = DatabaseResetCoordinator::new(spec.postgres.clone())
        .run()
        .await?;
    success(&format!("Database '{}' is ready", spec.postgres.database));
    Ok(report)
}

/// Runs the reset-db command.
pub async fn run_reset_db(spec: &FixtureSpec, format: OutputFormat) -> crate::CliResult<()> {
    let report = reset_db(spec).await?;
    output(&report_rows(&report), format)
}
