//! Deployment targets: one physical database and its connection pool.

use std::str::FromStr;
use std::sync::Arc;

use oxide_change::Dialect;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::context::DeployContext;
use crate::error::{DeployError, Result};

/// A connected database.
///
/// Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    url: String,
    dialect: Arc<Dialect>,
    pool: SqlitePool,
}

impl Target {
    /// Connects to `url`, naming the target after the URL.
    ///
    /// # Errors
    ///
    /// See [`Target::connect_named`].
    pub async fn connect(ctx: &DeployContext, url: &str) -> Result<Self> {
        Self::connect_named(ctx, url, url).await
    }

    /// Connects to `url` under the given target name.
    ///
    /// In-memory databases are served by a single long-lived connection so
    /// every query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns a dialect error if no dialect handles the URL,
    /// [`DeployError::UnsupportedTarget`] if the dialect has no driver here,
    /// or a database error if the connection fails.
    pub async fn connect_named(ctx: &DeployContext, name: &str, url: &str) -> Result<Self> {
        let dialect = ctx.changes.dialects().for_url(url)?;
        if dialect.name() != "sqlite" {
            return Err(DeployError::UnsupportedTarget {
                url: url.to_string(),
                dialect: dialect.name().to_string(),
            });
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new();
        if is_memory_url(url) {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        debug!(target_name = %name, dialect = dialect.name(), "Connected");

        Ok(Self::from_pool(name, url, dialect, pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(
        name: impl Into<String>,
        url: impl Into<String>,
        dialect: Arc<Dialect>,
        pool: SqlitePool,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            dialect,
            pool,
        }
    }

    /// Returns the target name used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the connection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the target's dialect.
    #[must_use]
    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    /// Returns the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool. Clones of this target are closed too.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
