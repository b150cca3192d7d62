//! Migration engine seam and its sqlx implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use ts_core::PostgresConfig;

use crate::error::{ResetError, ResetResult};
use crate::pool::{create_pool, target, PoolConfig};

/// Destructive clean and forward migrate over one database.
#[async_trait]
pub trait MigrationEngine: Send + Sync {
    /// Drops every object in the managed schema, migration history included.
    async fn clean(&self) -> ResetResult<()>;

    /// Applies pending migrations; returns how many the set contains.
    async fn migrate(&self) -> ResetResult<usize>;
}

/// Drops every user object in the current schema.
///
/// Objects owned by extensions are left alone; dropping them fails.
/// Relations go in dependency order: views, then tables, then sequences, so
/// identity sequences disappear with their table.
const CLEAN_SQL: &str = r"
DO $$
DECLARE
    r record;
BEGIN
    FOR r IN SELECT c.relname, c.relkind
             FROM pg_class c
             JOIN pg_namespace n ON n.oid = c.relnamespace
             WHERE n.nspname = current_schema()
               AND c.relkind IN ('m', 'v', 'r', 'p', 'f', 'S')
               AND NOT c.relispartition
               AND NOT EXISTS (
                   SELECT 1 FROM pg_depend d WHERE d.objid = c.oid AND d.deptype = 'e'
               )
             ORDER BY CASE c.relkind WHEN 'm' THEN 0 WHEN 'v' THEN 1 WHEN 'S' THEN 3 ELSE 2 END
             LOOP
        EXECUTE format(
            'DROP %s IF EXISTS %I CASCADE',
            CASE r.relkind
                WHEN 'm' THEN 'MATERIALIZED VIEW'
                WHEN 'v' THEN 'VIEW'
                WHEN 'f' THEN 'FOREIGN TABLE'
                WHEN 'S' THEN 'SEQUENCE'
                ELSE 'TABLE'
            END,
            r.relname
        );
    END LOOP;

    FOR r IN SELECT p.oid::regprocedure AS signature
             FROM pg_proc p
             JOIN pg_namespace n ON n.oid = p.pronamespace
             WHERE n.nspname = current_schema()
               AND p.prokind IN ('f', 'p', 'a', 'w')
               AND NOT EXISTS (
                   SELECT 1 FROM pg_depend d WHERE d.objid = p.oid AND d.deptype = 'e'
               ) LOOP
        EXECUTE format('DROP ROUTINE IF EXISTS %s CASCADE', r.signature);
    END LOOP;

    FOR r IN SELECT t.typname
             FROM pg_type t
             JOIN pg_namespace n ON n.oid = t.typnamespace
             WHERE n.nspname = current_schema()
               AND t.typtype = 'd'
               AND NOT EXISTS (
                   SELECT 1 FROM pg_depend d WHERE d.objid = t.oid AND d.deptype = 'e'
               ) LOOP
        EXECUTE format('DROP DOMAIN IF EXISTS %I CASCADE', r.typname);
    END LOOP;

    FOR r IN SELECT t.typname
             FROM pg_type t
             JOIN pg_namespace n ON n.oid = t.typnamespace
             LEFT JOIN pg_class c ON c.oid = t.typrelid
             WHERE n.nspname = current_schema()
               AND (t.typtype = 'e' OR (t.typtype = 'c' AND c.relkind = 'c'))
               AND NOT EXISTS (
                   SELECT 1 FROM pg_depend d WHERE d.objid = t.oid AND d.deptype = 'e'
               ) LOOP
        EXECUTE format('DROP TYPE IF EXISTS %I CASCADE', r.typname);
    END LOOP;
END
$$;
";

/// [`MigrationEngine`] backed by a sqlx pool and `sqlx::migrate`.
#[derive(Debug, Clone)]
pub struct SqlxMigrationEngine {
    pool: PgPool,
    migrations: Option<PathBuf>,
    target: String,
}

impl SqlxMigrationEngine {
    /// Opens a pool against `config`.
    ///
    /// # Errors
    ///
    /// Returns `ResetError::Connection` if the database cannot be reached.
    pub async fn connect(config: &PostgresConfig, pool: &PoolConfig) -> ResetResult<Self> {
        let engine = Self {
            pool: create_pool(config, pool).await?,
            migrations: config.migrations_location.clone(),
            target: target(config),
        };
        tracing::info!("Connected to database {}", engine.target);
        Ok(engine)
    }

    /// Closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MigrationEngine for SqlxMigrationEngine {
    async fn clean(&self) -> ResetResult<()> {
        tracing::warn!("Dropping every object in the current schema of {}", self.target);

        sqlx::raw_sql(CLEAN_SQL)
            .execute(&self.pool)
            .await
            .map_err(ResetError::Clean)?;

        tracing::info!("Cleaned {}", self.target);
        Ok(())
    }

    async fn migrate(&self) -> ResetResult<usize> {
        let Some(location) = self.migrations.as_deref() else {
            tracing::debug!("No migration location configured, nothing to apply");
            return Ok(0);
        };

        let migrator = Migrator::new(location).await?;
        let count = migrator.iter().count();
        tracing::debug!("Loaded {} migrations from {}", count, location.display());

        migrator.run(&self.pool).await?;

        tracing::info!("Migrated {} from {}", self.target, location.display());
        Ok(count)
    }
}
