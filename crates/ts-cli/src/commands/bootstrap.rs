//! Provision, reset, then publish.

use ts_core::{ContextPublisher, FixtureSpec};

use crate::config::OutputFormat;
use crate::output::output_overlay;

use super::provision::provision;
use super::reset::reset_db;

/// Runs the bootstrap command.
///
/// Identity comes first; a failed provisioning run leaves the database alone.
pub async fn run_bootstrap(spec: &FixtureSpec, format: OutputFormat) -> crate::CliResult<()> {
    provision(spec).await?;
    reset_db(spec).await?;
    output_overlay(&ContextPublisher::publish(spec), format)
}
