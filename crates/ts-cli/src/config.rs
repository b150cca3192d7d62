//! Override layering and output settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ts_core::{EnvSource, FileSource, FixtureSpec, LayeredSource};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "testsupport.toml";

/// Builds the override stack: environment first, then the config file.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
/// used if present in the working directory.
///
/// # Errors
///
/// Returns a configuration error if the file cannot be read or parsed.
pub fn load_sources(path: Option<&Path>) -> crate::CliResult<LayeredSource> {
    let sources = LayeredSource::new().with(EnvSource);

    let file = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };

    match file {
        Some(file) => {
            tracing::debug!("Reading overrides from {}", file.display());
            Ok(sources.with(FileSource::load(&file)?))
        }
        None => Ok(sources),
    }
}

/// Resolves the fixture from the layered overrides.
///
/// # Errors
///
/// Returns a configuration error for an unreadable file or a malformed value.
pub fn resolve(path: Option<&Path>) -> crate::CliResult<FixtureSpec> {
    let sources = load_sources(path)?;
    Ok(FixtureSpec::resolve(&sources)?)
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Java `.properties` lines.
    Properties,
    /// `KEY=value` lines for a shell.
    Env,
    /// Quiet (minimal output).
    Quiet,
}
