//! Built-in command steps and the standard command set.

mod database;
mod diff;
mod lock;
mod reset;
mod update;

pub use database::{ChangeLogStep, DatabaseStep};
pub use diff::{
    CompareControl, CompareControlStep, DiffOutputControl, DiffOutputControlStep, SchemaComparison,
};
pub use lock::{LockStep, ReleaseLocksStep};
pub use reset::ResetStep;
pub use update::{HistoryStep, UpdateSqlStep, UpdateStep};

use std::sync::Arc;

use oxide_change::Sql;

use crate::changelog::ChangeLog;
use crate::cleanup::CleanupReport;
use crate::ledger::AppliedChangeSet;
use crate::lock::{Lock, LockStatus};
use crate::pipeline::{CommandBuilder, CommandRegistry, ResultDefinition, ResultKey};
use crate::session::UpdateReport;
use crate::target::Target;

/// The connected target.
pub const TARGET: ResultKey<Target> = ResultKey::new("target");
/// The loaded changelog.
pub const CHANGELOG: ResultKey<ChangeLog> = ResultKey::new("changelog");
/// The held target lock.
pub const LOCK: ResultKey<Arc<Lock>> = ResultKey::new("lock");
/// What `update` did.
pub const UPDATE_REPORT: ResultKey<UpdateReport> = ResultKey::new("updateReport");
/// SQL `updateSql` rendered.
pub const UPDATE_SQL: ResultKey<Vec<Sql>> = ResultKey::new("updateSql");
/// Ledger rows.
pub const HISTORY: ResultKey<Vec<AppliedChangeSet>> = ResultKey::new("history");
/// Lock row after `releaseLocks`.
pub const LOCK_STATUS: ResultKey<LockStatus> = ResultKey::new("lockStatus");
/// What `dropAll` did.
pub const CLEANUP_REPORT: ResultKey<CleanupReport> = ResultKey::new("cleanupReport");
/// Schema comparison settings.
pub const COMPARE_CONTROL: ResultKey<CompareControl> = ResultKey::new("compareControl");
/// Diff output settings.
pub const DIFF_OUTPUT_CONTROL: ResultKey<DiffOutputControl> = ResultKey::new("diffOutputControl");

impl CommandRegistry {
    /// Returns a registry with the built-in commands and steps.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register_command(
            CommandBuilder::new("update")
                .alias("migrate")
                .description("Apply pending change sets under the target lock")
                .result(ResultDefinition::of(UPDATE_REPORT, "Applied and skipped change sets"))
                .build(),
        );
        registry.register_command(
            CommandBuilder::new("updateSql")
                .alias("update-sql")
                .description("Print the SQL update would run, without taking the lock")
                .result(ResultDefinition::of(UPDATE_SQL, "Rendered statements"))
                .build(),
        );
        registry.register_command(
            CommandBuilder::new("history")
                .description("List applied change sets")
                .result(ResultDefinition::of(HISTORY, "Ledger rows in execution order"))
                .build(),
        );
        registry.register_command(
            CommandBuilder::new("releaseLocks")
                .alias("release-locks")
                .description("Clear the target lock whoever holds it")
                .result(ResultDefinition::of(LOCK_STATUS, "Lock row after release"))
                .build(),
        );
        registry.register_command(
            CommandBuilder::new("dropAll")
                .alias("drop-all")
                .description("Drop the given tables and the ledger")
                .result(ResultDefinition::of(CLEANUP_REPORT, "Dropped and absent tables"))
                .build(),
        );
        registry.register_command(
            CommandBuilder::new("diffOutputControl")
                .description("Build the settings controlling diff output")
                .result(ResultDefinition::of(DIFF_OUTPUT_CONTROL, "Diff output settings"))
                .build(),
        );

        registry.register_step(DatabaseStep);
        registry.register_step(ChangeLogStep);
        registry.register_step(LockStep);
        registry.register_step(UpdateStep);
        registry.register_step(UpdateSqlStep);
        registry.register_step(HistoryStep);
        registry.register_step(ReleaseLocksStep);
        registry.register_step(ResetStep);
        registry.register_step(CompareControlStep);
        registry.register_step(DiffOutputControlStep);
        registry
    }
}
