//! The deployment ledger.
//!
//! Two tables record deployment state on every target: the history table
//! lists applied change sets with their checksums, and the lock table holds
//! a single row (`id = 1`) guarding sessions. Both are created through the
//! generator registry so their column types follow the target dialect.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use oxide_change::prelude::*;
use oxide_change::statement::{ColumnDefinition, CreateTable};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::cleanup::is_already_absent;
use crate::config::LedgerConfig;
use crate::context::DeployContext;
use crate::error::{DeployError, Result};
use crate::lock::Lock;
use crate::target::Target;

/// A change set recorded in the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChangeSet {
    /// Change set id.
    pub id: String,
    /// Change set author.
    pub author: String,
    /// Changelog file name.
    pub filename: String,
    /// Checksum recorded when applied.
    pub checksum: String,
    /// Position in execution order, starting at 1.
    pub order_executed: i64,
    /// When the change set was applied.
    pub date_executed: DateTime<Utc>,
    /// Names of the applied changes.
    pub description: String,
}

impl AppliedChangeSet {
    /// Returns `filename::id::author`.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("{}::{}::{}", self.filename, self.id, self.author)
    }
}

type HistoryRow = (String, String, String, String, i64, String, String);

/// Ledger table names and queries for one target.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: LedgerConfig,
    dialect: Arc<Dialect>,
    generators: GeneratorRegistry,
}

impl Ledger {
    /// Creates the ledger for a target.
    #[must_use]
    pub fn new(config: LedgerConfig, dialect: Arc<Dialect>, generators: GeneratorRegistry) -> Self {
        Self {
            config,
            dialect,
            generators,
        }
    }

    /// Creates the ledger for a target using the context's configuration.
    #[must_use]
    pub fn for_target(ctx: &DeployContext, target: &Target) -> Self {
        Self::new(
            ctx.config.ledger.clone(),
            Arc::clone(target.dialect()),
            ctx.changes.generators().clone(),
        )
    }

    /// Returns the ledger configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub(crate) fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    /// Returns the history table reference in the default ledger scope.
    #[must_use]
    pub fn history_table(&self) -> TableRef {
        self.scoped(self.config.history_table(), false)
    }

    /// Returns the lock table reference in the default ledger scope.
    #[must_use]
    pub fn lock_table(&self) -> TableRef {
        self.scoped(self.config.lock_table(), false)
    }

    /// Returns the history and lock tables in the alternate scope, if one is
    /// configured and the dialect can address it.
    #[must_use]
    pub fn alternate_tables(&self) -> Option<[TableRef; 2]> {
        let capabilities = self.dialect.capabilities();
        let addressable = (self.config.alt_schema.is_some() && capabilities.schemas)
            || (self.config.alt_catalog.is_some() && capabilities.catalogs);
        if !addressable {
            return None;
        }
        Some([
            self.scoped(self.config.lock_table(), true),
            self.scoped(self.config.history_table(), true),
        ])
    }

    fn scoped(&self, name: String, alternate: bool) -> TableRef {
        let (catalog, schema) = if alternate {
            (&self.config.alt_catalog, &self.config.alt_schema)
        } else {
            (&self.config.catalog, &self.config.schema)
        };
        TableRef {
            catalog: catalog.clone(),
            schema: schema.clone(),
            name,
        }
    }

    fn history_definition(&self) -> Statement {
        let varchar = |n| DataType::Varchar(Some(n));
        let required = |name: &str, data_type: DataType| ColumnDefinition {
            nullable: false,
            ..ColumnDefinition::new(name, data_type)
        };
        let key = |name: &str| ColumnDefinition {
            primary_key: true,
            ..required(name, varchar(255))
        };

        CreateTable {
            table: self.history_table(),
            columns: vec![
                key("id"),
                key("author"),
                key("filename"),
                required("checksum", varchar(70)),
                required("order_executed", DataType::Integer),
                required("date_executed", DataType::DateTime),
                ColumnDefinition::new("description", varchar(255)),
            ],
        }
        .into()
    }

    fn lock_definition(&self) -> Statement {
        CreateTable {
            table: self.lock_table(),
            columns: vec![
                ColumnDefinition {
                    primary_key: true,
                    nullable: false,
                    ..ColumnDefinition::new("id", DataType::Integer)
                },
                ColumnDefinition {
                    nullable: false,
                    ..ColumnDefinition::new("locked", DataType::Boolean)
                },
                ColumnDefinition::new("lock_granted", DataType::DateTime),
                ColumnDefinition::new("locked_by", DataType::Varchar(Some(255))),
            ],
        }
        .into()
    }

    /// Creates the history table if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe or the creation fails.
    pub async fn init_history(&self, conn: &mut SqliteConnection) -> Result<()> {
        let table = self.history_table();
        if self.create_if_absent(conn, &table, &self.history_definition()).await? {
            debug!(table = %table.name, "Created history table");
        }
        Ok(())
    }

    /// Creates the lock table and its single row if they are absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe, creation or row insert fails.
    pub async fn init_lock(&self, conn: &mut SqliteConnection) -> Result<()> {
        let table = self.lock_table();
        if self.create_if_absent(conn, &table, &self.lock_definition()).await? {
            debug!(table = %table.name, "Created lock table");
        }

        let escaped = table.escaped(&self.dialect);
        sqlx::query(&format!(
            "INSERT INTO {escaped} (id, locked) SELECT 1, {} \
             WHERE NOT EXISTS (SELECT 1 FROM {escaped} WHERE id = 1)",
            self.dialect.boolean_literal(false)
        ))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Returns true if this call created the table. Losing a creation race
    /// to another session is not an error.
    async fn create_if_absent(
        &self,
        conn: &mut SqliteConnection,
        table: &TableRef,
        statement: &Statement,
    ) -> Result<bool> {
        if self.table_exists(conn, table).await? {
            return Ok(false);
        }
        if let Err(e) = self.create(conn, statement).await {
            if self.table_exists(conn, table).await? {
                return Ok(false);
            }
            return Err(e);
        }
        Ok(true)
    }

    async fn table_exists(&self, conn: &mut SqliteConnection, table: &TableRef) -> Result<bool> {
        let probe = format!("SELECT COUNT(*) FROM {}", table.escaped(&self.dialect));
        match sqlx::query(&probe).execute(&mut *conn).await {
            Ok(_) => Ok(true),
            Err(e) if is_already_absent(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, conn: &mut SqliteConnection, statement: &Statement) -> Result<()> {
        for sql in self.generators.generate_sql(statement, &self.dialect)? {
            sqlx::query(&sql).execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Lists applied change sets in execution order.
    ///
    /// A missing history table means nothing was applied yet.
    ///
    /// # Errors
    ///
    /// Returns a database error for anything but an absent table.
    pub async fn applied(&self, conn: &mut SqliteConnection) -> Result<Vec<AppliedChangeSet>> {
        let sql = format!(
            "SELECT id, author, filename, checksum, order_executed, date_executed, description \
             FROM {} ORDER BY order_executed",
            self.history_table().escaped(&self.dialect)
        );
        match sqlx::query_as::<_, HistoryRow>(&sql).fetch_all(&mut *conn).await {
            Ok(rows) => Ok(rows.into_iter().map(into_applied).collect()),
            Err(e) if is_already_absent(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up the record of a change set.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        changeset: &ChangeSet,
    ) -> Result<Option<AppliedChangeSet>> {
        let sql = format!(
            "SELECT id, author, filename, checksum, order_executed, date_executed, description \
             FROM {} WHERE id = ? AND author = ? AND filename = ?",
            self.history_table().escaped(&self.dialect)
        );
        let row = sqlx::query_as::<_, HistoryRow>(&sql)
            .bind(&changeset.id)
            .bind(&changeset.author)
            .bind(&changeset.filename)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(into_applied))
    }

    /// Records a change set as applied.
    ///
    /// Requires a held lock on the target.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::LockNotHeld`] if `lock` was released, or a
    /// database error if the insert fails.
    pub async fn record(
        &self,
        conn: &mut SqliteConnection,
        lock: &Lock,
        changeset: &ChangeSet,
        checksum: &CheckSum,
    ) -> Result<AppliedChangeSet> {
        if !lock.is_held() {
            return Err(DeployError::LockNotHeld {
                target: lock.target().to_string(),
            });
        }

        let table = self.history_table().escaped(&self.dialect);
        let (order,): (i64,) =
            sqlx::query_as(&format!("SELECT COALESCE(MAX(order_executed), 0) + 1 FROM {table}"))
                .fetch_one(&mut *conn)
                .await?;

        let applied = AppliedChangeSet {
            id: changeset.id.clone(),
            author: changeset.author.clone(),
            filename: changeset.filename.clone(),
            checksum: checksum.to_string(),
            order_executed: order,
            date_executed: Utc::now(),
            description: changeset.description(),
        };

        sqlx::query(&format!(
            "INSERT INTO {table} (id, author, filename, checksum, order_executed, date_executed, description) \
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&applied.id)
        .bind(&applied.author)
        .bind(&applied.filename)
        .bind(&applied.checksum)
        .bind(applied.order_executed)
        .bind(applied.date_executed.to_rfc3339())
        .bind(&applied.description)
        .execute(&mut *conn)
        .await?;

        Ok(applied)
    }
}

fn into_applied(row: HistoryRow) -> AppliedChangeSet {
    let (id, author, filename, checksum, order_executed, date, description) = row;
    let date_executed = DateTime::parse_from_rfc3339(&date)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(&date, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.and_utc())
                .unwrap_or_default()
        });
    AppliedChangeSet {
        id,
        author,
        filename,
        checksum,
        order_executed,
        date_executed,
        description,
    }
}
