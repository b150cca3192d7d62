//! # ts-cli
//!
//! The `testsupport` command line. It resolves a fixture from the
//! environment and an optional TOML file, then:
//! - provisions the Keycloak realm, client, user and role
//! - cleans and migrates the Postgres database
//! - prints the properties dependent tests connect with

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};
