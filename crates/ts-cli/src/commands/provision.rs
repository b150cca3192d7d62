//! Keycloak provisioning command.

use serde::Serialize;
use tabled::Tabled;
use ts_core::FixtureSpec;
use ts_keycloak::{ProvisionReport, ProvisioningPipeline};

use crate::config::OutputFormat;
use crate::output::{output, success};

/// One provisioned resource, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ProvisionedDisplay {
    /// Resource kind.
    #[tabled(rename = "Resource")]
    pub resource: String,
    /// Name the fixture gave it.
    #[tabled(rename = "Name")]
    pub name: String,
    /// Server-side identifier, `-` when unknown.
    #[tabled(rename = "ID")]
    pub id: String,
}

impl ProvisionedDisplay {
    fn new(resource: &str, name: &str, id: Option<&str>) -> Self {
        Self {
            resource: resource.to_string(),
            name: name.to_string(),
            id: id.unwrap_or("-").to_string(),
        }
    }
}

/// Display rows for a report.
#[must_use]
pub fn report_rows(spec: &FixtureSpec, report: &ProvisionReport) -> Vec<ProvisionedDisplay> {
    vec![
        ProvisionedDisplay::new("realm", &report.realm, Some(&report.realm)),
        ProvisionedDisplay::new(
            "client",
            &spec.keycloak.test_client_id,
            report.client.id.as_deref(),
        ),
        ProvisionedDisplay::new("user", &report.user.username, Some(&report.user.id)),
        ProvisionedDisplay::new("role", &report.role.name, report.role.id.as_deref()),
    ]
}

/// Runs the provisioning pipeline for `spec`.
pub async fn provision(spec: &FixtureSpec) -> crate::CliResult<ProvisionReport> {
    let report = ProvisioningPipeline::new(spec.keycloak.clone()).run().await?;
    success(&format!(
        "Provisioned realm '{}' at {}",
        report.realm,
        spec.keycloak.server_url()
    ));
    Ok(report)
}

/// Runs the provision command.
pub async fn run_provision(spec: &FixtureSpec, format: OutputFormat) -> crate::CliResult<()> {
    let report = provision(spec).await?;
    output(&report_rows(spec, &report), format)
}
