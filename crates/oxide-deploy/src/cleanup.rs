//! Dropping deployment objects and the ledger.

use oxide_change::statement::{DropTable, Statement, TableRef};
use sqlx::error::DatabaseError;
use tracing::{debug, info};

use crate::error::{DeployError, Result};
use crate::ledger::Ledger;
use crate::lock::Lock;
use crate::target::Target;

/// Driver codes meaning "table does not exist": PostgreSQL, MySQL,
/// SQL Server and the ODBC state.
const ABSENT_CODES: &[&str] = &["42P01", "1051", "3701", "42S02"];

/// Returns true if the error says the object was already absent.
#[must_use]
pub fn is_already_absent(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => is_absent_database_error(db.as_ref()),
        _ => false,
    }
}

fn is_absent_database_error(db: &dyn DatabaseError) -> bool {
    if db
        .code()
        .is_some_and(|code| ABSENT_CODES.contains(&code.as_ref()))
    {
        return true;
    }
    db.message().to_ascii_lowercase().contains("no such table")
}

/// What a cleanup run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Tables dropped.
    pub dropped: Vec<String>,
    /// Tables that were already gone.
    pub absent: Vec<String>,
}

/// Drops change-domain tables, then the ledger.
///
/// Order: the given objects, the lock and history tables in the ledger
/// scope, then both again in the alternate scope when the dialect supports
/// it. An absent table is not an error; any other failure stops the run.
#[derive(Debug)]
pub struct Cleanup<'a> {
    target: &'a Target,
    ledger: &'a Ledger,
    objects: Vec<TableRef>,
}

impl<'a> Cleanup<'a> {
    /// Creates a cleanup for a target.
    #[must_use]
    pub fn new(target: &'a Target, ledger: &'a Ledger) -> Self {
        Self {
            target,
            ledger,
            objects: Vec::new(),
        }
    }

    /// Adds tables to drop before the ledger.
    #[must_use]
    pub fn objects(mut self, objects: impl IntoIterator<Item = TableRef>) -> Self {
        self.objects.extend(objects);
        self
    }

    /// Runs the cleanup under a held lock on the target.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::LockNotHeld`] if `lock` was released or
    /// belongs to another target, [`DeployError::Cleanup`] for a failed drop
    /// other than an absent table, or a resolve error if no generator
    /// renders the drop.
    pub async fn run(self, lock: &Lock) -> Result<CleanupReport> {
        if !lock.is_held() || lock.target() != self.target.name() {
            return Err(DeployError::LockNotHeld {
                target: self.target.name().to_string(),
            });
        }

        let mut tables = self.objects.clone();
        tables.push(self.ledger.lock_table());
        tables.push(self.ledger.history_table());
        if let Some(alternate) = self.ledger.alternate_tables() {
            tables.extend(alternate);
        }

        let mut report = CleanupReport::default();
        for table in &tables {
            self.drop_table(table, &mut report).await?;
        }
        info!(
            target_name = %self.target.name(),
            dropped = report.dropped.len(),
            absent = report.absent.len(),
            "Cleanup finished"
        );
        Ok(report)
    }

    async fn drop_table(&self, table: &TableRef, report: &mut CleanupReport) -> Result<()> {
        let dialect = self.target.dialect();
        let statement: Statement = DropTable {
            table: table.clone(),
            cascade: false,
            if_exists: false,
        }
        .into();
        let escaped = table.escaped(dialect);

        for sql in self.ledger.generators().generate_sql(&statement, dialect)? {
            match sqlx::query(&sql).execute(self.target.pool()).await {
                Ok(_) => {
                    debug!(table = %escaped, "Dropped");
                    report.dropped.push(escaped.clone());
                }
                Err(e) if is_already_absent(&e) => {
                    debug!(table = %escaped, "Already absent");
                    report.absent.push(escaped.clone());
                }
                Err(source) => {
                    return Err(DeployError::Cleanup {
                        target: self.target.name().to_string(),
                        sql,
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;
    use crate::context::DeployContext;
    use crate::lock::LockService;

    async fn setup() -> (DeployContext, Target, Ledger, LockService) {
        let ctx = DeployContext::standard(DeployConfig::default());
        let target = Target::connect(&ctx, "sqlite::memory:").await.unwrap();
        let ledger = Ledger::for_target(&ctx, &target);
        let locks = LockService::new(&ctx, &target);
        locks.init().await.unwrap();
        sqlx::query("CREATE TABLE widgets (id INTEGER)")
            .execute(target.pool())
            .await
            .unwrap();
        (ctx, target, ledger, locks)
    }

    async fn exists(target: &Target, table: &str) -> bool {
        sqlx::query(&format!("SELECT COUNT(*) FROM {table}"))
            .execute(target.pool())
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_absent_tables() {
        let (_ctx, target, ledger, locks) = setup().await;
        let lock = locks.acquire().await.unwrap();

        let report = Cleanup::new(&target, &ledger)
            .objects([TableRef::new("widgets"), TableRef::new("gadgets")])
            .run(&lock)
            .await
            .unwrap();

        assert_eq!(report.dropped, vec![r#""widgets""#, r#""oxide_changeloglock""#]);
        assert_eq!(report.absent, vec![r#""gadgets""#, r#""oxide_changelog""#]);
        locks.release(&lock).await.unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_requires_held_lock() {
        let (ctx, target, ledger, locks) = setup().await;
        let lock = locks.acquire().await.unwrap();
        locks.release(&lock).await.unwrap();

        let err = Cleanup::new(&target, &ledger)
            .objects([TableRef::new("widgets")])
            .run(&lock)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::LockNotHeld { .. }));

        let other = Target::connect_named(&ctx, "other", "sqlite::memory:").await.unwrap();
        let foreign = LockService::new(&ctx, &other);
        foreign.init().await.unwrap();
        let foreign_lock = foreign.acquire().await.unwrap();
        let err = Cleanup::new(&target, &ledger)
            .run(&foreign_lock)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::LockNotHeld { .. }));

        assert!(exists(&target, "widgets").await);
        assert!(exists(&target, "oxide_changeloglock").await);
    }

    #[tokio::test]
    async fn test_unexpected_failure_stops_cleanup() {
        let (_ctx, target, ledger, locks) = setup().await;
        sqlx::query("CREATE VIEW widget_view AS SELECT id FROM widgets")
            .execute(target.pool())
            .await
            .unwrap();
        let mut conn = target.pool().acquire().await.unwrap();
        ledger.init_history(&mut conn).await.unwrap();
        drop(conn);
        let lock = locks.acquire().await.unwrap();

        let err = Cleanup::new(&target, &ledger)
            .objects([TableRef::new("widget_view"), TableRef::new("widgets")])
            .run(&lock)
            .await
            .unwrap_err();
        match err {
            DeployError::Cleanup { sql, .. } => assert_eq!(sql, r#"DROP TABLE "widget_view""#),
            other => panic!("expected a cleanup error, got {other:?}"),
        }

        assert!(exists(&target, "widgets").await);
        assert!(exists(&target, "oxide_changeloglock").await);
        assert!(exists(&target, "oxide_changelog").await);
        assert!(locks.status().await.unwrap().locked);
    }

    #[tokio::test]
    async fn test_absent_classification() {
        let ctx = DeployContext::standard(DeployConfig::default());
        let target = Target::connect(&ctx, "sqlite::memory:").await.unwrap();

        let missing = sqlx::query("DROP TABLE nowhere")
            .execute(target.pool())
            .await
            .unwrap_err();
        assert!(is_already_absent(&missing));

        let syntax = sqlx::query("DROP TABLEZ nowhere")
            .execute(target.pool())
            .await
            .unwrap_err();
        assert!(!is_already_absent(&syntax));
    }
}
