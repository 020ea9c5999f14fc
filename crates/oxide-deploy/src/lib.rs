//! # oxide-deploy
//!
//! Applies [`oxide_change`] changelogs to databases exactly once.
//!
//! - [`Target`]: a connected database and its dialect.
//! - [`Ledger`]: history and lock tables recording deployment state.
//! - [`LockService`]: one session per target at a time.
//! - [`DeploySession`]: lock, verify checksums, apply pending change sets.
//! - [`Cleanup`]: drop change-domain tables and the ledger.
//! - [`pipeline`]: commands as ordered steps exchanging typed results.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxide_change::prelude::*;
//! use oxide_deploy::prelude::*;
//!
//! # async fn run() -> oxide_deploy::Result<()> {
//! let ctx = DeployContext::standard(DeployConfig::default());
//! let target = Target::connect(&ctx, "sqlite:app.db").await?;
//!
//! let changelog = ChangeLog::new(vec![ChangeSet::new("1", "ada", "main.json").change(
//!     CreateTableChange::new("users")
//!         .column(ColumnConfig::new("id").with_type("int").primary_key().auto_increment()),
//! )]);
//!
//! let report = DeploySession::new(&ctx, &target).update(&changelog).await?;
//! println!("applied {:?}", report.applied);
//! # Ok(())
//! # }
//! ```

pub mod changelog;
pub mod cleanup;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod lock;
pub mod pipeline;
pub mod session;
pub mod steps;
pub mod target;

pub use changelog::ChangeLog;
pub use cleanup::{Cleanup, CleanupReport};
pub use config::{DeployConfig, LedgerConfig};
pub use context::DeployContext;
pub use error::{DeployError, PipelineError, Result};
pub use ledger::{AppliedChangeSet, Ledger};
pub use lock::{Lock, LockService, LockStatus, SessionId};
pub use session::{update_targets, DeploySession, UpdateReport};
pub use target::Target;

/// Common imports.
pub mod prelude {
    pub use crate::changelog::ChangeLog;
    pub use crate::cleanup::{Cleanup, CleanupReport};
    pub use crate::config::{DeployConfig, LedgerConfig};
    pub use crate::context::DeployContext;
    pub use crate::error::{DeployError, PipelineError};
    pub use crate::ledger::{AppliedChangeSet, Ledger};
    pub use crate::lock::{Lock, LockService, LockStatus, SessionId};
    pub use crate::pipeline::{CommandRegistry, CommandStep, PipelineResults, ResultKey};
    pub use crate::session::{DeploySession, UpdateReport};
    pub use crate::target::Target;
}
