//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::OutputFormat;

/// testsupport - disposable Keycloak and Postgres fixtures for integration tests.
#[derive(Debug, Parser)]
#[command(name = "testsupport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML file with overrides; the environment still wins.
    #[arg(short, long, env = "TESTSUPPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recreate the test realm, client, user and role.
    Provision,

    /// Clean and migrate the test database according to the switches.
    ResetDb,

    /// Provision, reset the database, then print the properties.
    Bootstrap,

    /// Print the properties derived from the resolved fixture.
    Properties,

    /// Print the resolved fixture with secrets masked.
    ShowConfig,

    /// Delete the test realm.
    Teardown {
        /// Realm to delete instead of the configured one.
        #[arg(long)]
        realm: Option<String>,
    },
}
