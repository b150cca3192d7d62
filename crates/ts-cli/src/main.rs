//! # testsupport
//!
//! Prepares Keycloak and Postgres for an integration test run.

#![forbid(unsafe_code)]

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ts_cli::{
    cli::{Cli, Command},
    commands::{
        run_bootstrap, run_properties, run_provision, run_reset_db, run_show_config,
        run_teardown,
    },
    config,
    output::error,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Resolution is total: nothing touches the network until it succeeds.
    let spec = match config::resolve(cli.config.as_deref()) {
        Ok(spec) => spec,
        Err(e) => {
            error(&e.to_string());
            std::process::exit(2);
        }
    };

    let result = match cli.command {
        Command::Provision => run_provision(&spec, cli.output).await,
        Command::ResetDb => run_reset_db(&spec, cli.output).await,
        Command::Bootstrap => run_bootstrap(&spec, cli.output).await,
        Command::Properties => run_properties(&spec, cli.output),
        Command::ShowConfig => run_show_config(&spec, cli.output),
        Command::Teardown { realm } => run_teardown(&spec, realm.as_deref()).await,
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}
