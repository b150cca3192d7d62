//! Clean-then-migrate coordination.

use ts_core::PostgresConfig;

use crate::engine::{MigrationEngine, SqlxMigrationEngine};
use crate::error::ResetResult;
use crate::pool::{target, PoolConfig};

/// Which reset operations to run. All four combinations are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetPlan {
    /// Drop every schema object first.
    pub clean: bool,
    /// Apply the migration set afterwards.
    pub migrate: bool,
}

impl ResetPlan {
    /// Reads the switches from `config`.
    #[must_use]
    pub const fn from_config(config: &PostgresConfig) -> Self {
        Self {
            clean: config.clean,
            migrate: config.migrate,
        }
    }

    /// Whether there is nothing to do.
    #[must_use]
    pub const fn is_noop(self) -> bool {
        !self.clean && !self.migrate
    }
}

/// What a reset run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Whether clean ran.
    pub cleaned: bool,
    /// Whether migrate ran.
    pub migrated: bool,
    /// Size of the migration set, when migrate ran.
    pub migrations: usize,
}

/// Runs `plan` against `engine`: clean, then migrate. Stops at the first error.
///
/// # Errors
///
/// Returns the engine's error unchanged.
pub async fn reset<E: MigrationEngine + ?Sized>(
    engine: &E,
    plan: ResetPlan,
) -> ResetResult<ResetReport> {
    let mut report = ResetReport::default();

    if plan.clean {
        engine.clean().await?;
        report.cleaned = true;
    }

    if plan.migrate {
        report.migrations = engine.migrate().await?;
        report.migrated = true;
    }

    Ok(report)
}

/// Resets the database described by a [`PostgresConfig`].
#[derive(Debug, Clone)]
pub struct DatabaseResetCoordinator {
    config: PostgresConfig,
    pool: PoolConfig,
}

impl DatabaseResetCoordinator {
    /// Creates a coordinator for `config`.
    #[must_use]
    pub fn new(config: PostgresConfig) -> Self {
        Self {
            config,
            pool: PoolConfig::default(),
        }
    }

    /// The plan derived from the config switches.
    #[must_use]
    pub const fn plan(&self) -> ResetPlan {
        ResetPlan::from_config(&self.config)
    }

    /// Connects and runs the plan. Does not connect when both switches are off.
    ///
    /// # Errors
    ///
    /// Returns `ResetError::Connection`, `Clean` or `Migrate`; nothing is retried.
    pub async fn run(&self) -> ResetResult<ResetReport> {
        let plan = self.plan();
        if plan.is_noop() {
            tracing::info!(
                "Clean and migrate both disabled, leaving {} untouched",
                target(&self.config)
            );
            return Ok(ResetReport::default());
        }

        let engine = SqlxMigrationEngine::connect(&self.config, &self.pool).await?;
        let result = reset(&engine, plan).await;
        engine.close().await;
        result
    }
}
