//! # ts-core
//!
//! Configuration resolution and test-context publishing for disposable
//! integration-test fixtures.
//!
//! This crate owns the data every other crate consumes:
//! - [`OverrideSource`] implementations that look up override keys
//! - [`FixtureSpec`], the immutable description of the environment to provision
//! - [`PropertyOverlay`], the connection properties handed to dependent tests

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod context;
pub mod error;
pub mod source;

pub use config::{FixtureSpec, KeycloakConfig, PostgresConfig};
pub use context::{ContextPublisher, PropertyOverlay};
pub use error::{ConfigError, Result};
pub use source::{EnvSource, FileSource, LayeredSource, MapSource, OverrideSource};
