//! Deployment sessions.
//!
//! A session applies a changelog to one target: it takes the target lock,
//! verifies the checksums of change sets already in the ledger, then runs
//! each pending change set in its own transaction and records it before
//! committing. The lock is released whether or not the update succeeded.

use std::collections::HashMap;

use futures::future::join_all;
use oxide_change::checksum::{changeset_checksum, verify};
use oxide_change::Sql;
use tracing::{debug, info, warn};

use crate::changelog::ChangeLog;
use crate::context::DeployContext;
use crate::error::{DeployError, Result};
use crate::executor::{ChangeOutcome, Executor};
use crate::ledger::{AppliedChangeSet, Ledger};
use crate::lock::{Lock, LockService};
use crate::target::Target;

/// What an update did on one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Target name.
    pub target: String,
    /// Identities of the change sets applied by this run.
    pub applied: Vec<String>,
    /// Identities of the change sets found in the ledger.
    pub already_applied: Vec<String>,
    /// Statements executed.
    pub statements: usize,
}

/// Applies changelogs to one target.
#[derive(Debug)]
pub struct DeploySession<'a> {
    ctx: &'a DeployContext,
    target: &'a Target,
    ledger: Ledger,
    locks: LockService,
}

impl<'a> DeploySession<'a> {
    /// Creates a session with a fresh lock session id.
    #[must_use]
    pub fn new(ctx: &'a DeployContext, target: &'a Target) -> Self {
        Self::with_locks(ctx, target, LockService::new(ctx, target))
    }

    /// Creates a session using the given lock service.
    #[must_use]
    pub fn with_locks(ctx: &'a DeployContext, target: &'a Target, locks: LockService) -> Self {
        Self {
            ctx,
            target,
            ledger: Ledger::for_target(ctx, target),
            locks,
        }
    }

    /// Returns the session's lock service.
    #[must_use]
    pub fn locks(&self) -> &LockService {
        &self.locks
    }

    /// Takes the lock, applies pending change sets, then releases the lock.
    ///
    /// # Errors
    ///
    /// Returns a lock error if the lock cannot be taken, or the first
    /// checksum, compile, resolve or execution error. The failing change
    /// set's transaction is rolled back.
    pub async fn update(&self, changelog: &ChangeLog) -> Result<UpdateReport> {
        self.locks.init().await?;
        let lock = self.locks.acquire().await?;

        let result = self.update_locked(&lock, changelog).await;
        let released = self.locks.release(&lock).await;

        let report = result?;
        released?;
        Ok(report)
    }

    /// Applies pending change sets under an already held lock.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::LockNotHeld`] before touching the database if
    /// `lock` was released or belongs to another target, otherwise see
    /// [`DeploySession::update`].
    pub async fn update_locked(&self, lock: &Lock, changelog: &ChangeLog) -> Result<UpdateReport> {
        if !lock.is_held() || lock.target() != self.target.name() {
            return Err(DeployError::LockNotHeld {
                target: self.target.name().to_string(),
            });
        }
        let dialect = self.target.dialect();
        let applied = {
            let mut conn = self.target.pool().acquire().await?;
            self.ledger.init_history(&mut conn).await?;
            self.ledger.applied(&mut conn).await?
        };
        let recorded: HashMap<String, AppliedChangeSet> = applied
            .into_iter()
            .map(|a| (a.identity(), a))
            .collect();

        let mut report = UpdateReport {
            target: self.target.name().to_string(),
            ..UpdateReport::default()
        };

        let mut pending = Vec::new();
        for changeset in &changelog.change_sets {
            let identity = changeset.identity();
            let computed = changeset_checksum(changeset, dialect)?;
            if let Some(previous) = recorded.get(&identity) {
                verify(&identity, &previous.checksum, &computed)?;
                debug!(change_set = %identity, "Already applied");
                report.already_applied.push(identity);
            } else {
                pending.push((changeset, computed));
            }
        }

        let executor = self.executor(changelog);
        for (changeset, checksum) in pending {
            let identity = changeset.identity();
            let mut tx = self.target.pool().begin().await?;

            for change in &changeset.changes {
                match executor.execute(&mut tx, change).await? {
                    ChangeOutcome::Applied { executed, .. } => {
                        report.statements += executed;
                        info!(change_set = %identity, "{}", change.confirmation_message());
                    }
                    ChangeOutcome::Filtered => {}
                }
            }

            self.ledger.record(&mut tx, lock, changeset, &checksum).await?;
            tx.commit().await?;
            info!(target_name = %self.target.name(), change_set = %identity, "Change set applied");
            report.applied.push(identity);
        }

        Ok(report)
    }

    /// Renders the SQL pending change sets would execute. Takes no lock and
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Returns a compile or resolve error, or a database error reading the
    /// ledger.
    pub async fn update_sql(&self, changelog: &ChangeLog) -> Result<Vec<Sql>> {
        let applied = self.history().await?;
        let executor = self.executor(changelog);
        let dialect = self.target.dialect();

        let mut sql = Vec::new();
        for changeset in &changelog.change_sets {
            if applied.iter().any(|a| a.identity() == changeset.identity()) {
                continue;
            }
            for change in changeset.changes.iter().filter(|c| c.applies_to(dialect)) {
                sql.extend(executor.render(change)?);
            }
        }
        Ok(sql)
    }

    /// Lists the ledger's applied change sets.
    ///
    /// # Errors
    ///
    /// Returns a database error if the ledger cannot be read.
    pub async fn history(&self) -> Result<Vec<AppliedChangeSet>> {
        let mut conn = self.target.pool().acquire().await?;
        self.ledger.applied(&mut conn).await
    }

    fn executor(&self, changelog: &ChangeLog) -> Executor<'a> {
        let executor = Executor::new(self.ctx, self.target);
        match &changelog.root {
            Some(root) => executor.with_resource_root(root),
            None => executor,
        }
    }
}

/// Updates several targets concurrently. Targets are independent: each has
/// its own pool, lock and transactions, and one failure does not stop the
/// others.
pub async fn update_targets(
    ctx: &DeployContext,
    targets: &[Target],
    changelog: &ChangeLog,
) -> Vec<Result<UpdateReport>> {
    let updates = targets.iter().map(|target| async move {
        let result = DeploySession::new(ctx, target).update(changelog).await;
        if let Err(e) = &result {
            warn!(target_name = %target.name(), error = %e, "Update failed");
        }
        result
    });
    join_all(updates).await
}
