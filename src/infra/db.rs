use anyhow::{anyhow, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::AppConfig;

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_create_comments",
    include_str!("../../migrations/001_create_comments.sql"),
)];

#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow!("missing required env var: DATABASE_URL"))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout_seconds))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime_seconds))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema. Every statement is idempotent.
    pub async fn migrate(&self) -> Result<()> {
        for &(name, sql) in MIGRATIONS {
            sqlx::raw_sql(sql)
                .execute(&self.pool)
                .await
                .map_err(|err| anyhow!("migration {} failed: {}", name, err))?;
            tracing::info!(migration = %name, "migration applied");
        }
        Ok(())
    }
}
