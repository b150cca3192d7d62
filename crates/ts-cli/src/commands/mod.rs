//! Command implementations.

pub mod bootstrap;
pub mod config;
pub mod provision;
pub mod reset;
pub mod teardown;

pub use bootstrap::run_bootstrap;
pub use config::{run_properties, run_show_config};
pub use provision::run_provision;
pub use reset::run_reset_db;
pub use teardown::run_teardown;
