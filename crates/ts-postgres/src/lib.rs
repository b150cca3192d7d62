//! # ts-postgres
//!
//! Resets a disposable Postgres database before a test run.
//!
//! [`DatabaseResetCoordinator`] reads the two switches of a
//! [`ts_core::PostgresConfig`] and drives a [`MigrationEngine`]: clean first,
//! then migrate. With both switches off it returns without connecting.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod pool;

pub use coordinator::{reset, DatabaseResetCoordinator, ResetPlan, ResetReport};
pub use engine::{MigrationEngine, SqlxMigrationEngine};
pub use error::{ResetError, ResetResult};
pub use pool::{connect_options, create_pool, PoolConfig};
