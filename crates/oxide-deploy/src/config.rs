//! Deployment configuration.
//!
//! Values come from CLI flags and environment variables, or from a JSON file
//! given with `--config`. Every field has a default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where the ledger tables live and what they are called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Prefix of the history and lock table names.
    pub table_prefix: String,
    /// Catalog holding the ledger.
    pub catalog: Option<String>,
    /// Schema holding the ledger.
    pub schema: Option<String>,
    /// Catalog of the alternate ledger copy.
    pub alt_catalog: Option<String>,
    /// Schema of the alternate ledger copy.
    pub alt_schema: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            table_prefix: "oxide_".to_string(),
            catalog: None,
            schema: None,
            alt_catalog: None,
            alt_schema: None,
        }
    }
}

impl LedgerConfig {
    /// Returns the history table name.
    #[must_use]
    pub fn history_table(&self) -> String {
        format!("{}changelog", self.table_prefix)
    }

    /// Returns the lock table name.
    #[must_use]
    pub fn lock_table(&self) -> String {
        format!("{}changeloglock", self.table_prefix)
    }

    /// Returns true if an alternate ledger scope is configured.
    #[must_use]
    pub fn has_alternate_scope(&self) -> bool {
        self.alt_catalog.is_some() || self.alt_schema.is_some()
    }
}

/// Settings for a deployment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployConfig {
    /// Connection URL of the default target.
    pub url: String,
    /// Ledger placement.
    pub ledger: LedgerConfig,
    /// How long to wait for the lock.
    pub lock_timeout_ms: u64,
    /// Delay between lock attempts.
    pub lock_poll_ms: u64,
    /// Statements no generator supports are skipped instead of failing.
    pub skip_on_unsupported: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:db.sqlite3".to_string(),
            ledger: LedgerConfig::default(),
            lock_timeout_ms: 5 * 60 * 1000,
            lock_poll_ms: 10_000,
            skip_on_unsupported: false,
        }
    }
}

impl DeployConfig {
    /// Reads a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a serialization
    /// error if it is not valid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Returns the lock timeout.
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Returns the lock poll interval.
    #[must_use]
    pub fn lock_poll(&self) -> Duration {
        Duration::from_millis(self.lock_poll_ms)
    }
}
