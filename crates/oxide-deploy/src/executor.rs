//! Statement execution against a target.
//!
//! Changes are compiled, resolved and rendered here, then executed on a
//! connection the caller owns (usually a change set's transaction).

use std::path::{Path, PathBuf};

use oxide_change::prelude::*;
use oxide_change::statement::PreparedInsert;
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::context::DeployContext;
use crate::error::{DeployError, Result};
use crate::target::Target;

/// What happened to one change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Statements were executed.
    Applied {
        /// Statements executed.
        executed: usize,
        /// Unsupported statements skipped.
        skipped: usize,
    },
    /// The DBMS filter excludes this target.
    Filtered,
}

/// A bind parameter read from a column value.
#[derive(Debug, Clone, PartialEq)]
enum Parameter {
    Null,
    Boolean(bool),
    Integer(i64),
    Text(String),
    Bytes(Vec<u8>),
}

/// Executes changes on one target.
#[derive(Debug)]
pub struct Executor<'a> {
    ctx: &'a DeployContext,
    target: &'a Target,
    resource_root: Option<PathBuf>,
}

impl<'a> Executor<'a> {
    /// Creates an executor.
    #[must_use]
    pub fn new(ctx: &'a DeployContext, target: &'a Target) -> Self {
        Self {
            ctx,
            target,
            resource_root: None,
        }
    }

    /// Resolves relative large-object file paths against `root`.
    #[must_use]
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(root.into());
        self
    }

    /// Compiles a change and renders its SQL without executing it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed change, or a resolve
    /// error for a statement that cannot be rendered and may not be skipped.
    pub fn render(&self, change: &Change) -> Result<Vec<Sql>> {
        let mut sql = Vec::new();
        for statement in self.compile(change)? {
            if let Some(fragments) = self.generate(&statement)? {
                sql.extend(fragments);
            }
        }
        Ok(sql)
    }

    /// Executes one change on `conn`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Execution`] with the failing SQL unless the
    /// statement continues on error, and any compile or resolve error.
    pub async fn execute(&self, conn: &mut SqliteConnection, change: &Change) -> Result<ChangeOutcome> {
        let dialect = self.target.dialect();
        if !change.applies_to(dialect) {
            debug!(change = change.name(), dialect = dialect.name(), "Excluded by dbms filter");
            return Ok(ChangeOutcome::Filtered);
        }

        let mut executed = 0;
        let mut skipped = 0;
        for statement in self.compile(change)? {
            let Some(fragments) = self.generate(&statement)? else {
                skipped += 1;
                continue;
            };

            let parameters = match statement.as_prepared_insert() {
                Some(insert) => Some(self.parameters(insert).await?),
                None => None,
            };

            for sql in fragments {
                debug!(target_name = %self.target.name(), sql = %sql, "Executing");
                let mut query = sqlx::query(&sql);
                if let Some(parameters) = &parameters {
                    for parameter in parameters {
                        query = match parameter.clone() {
                            Parameter::Null => query.bind(None::<String>),
                            Parameter::Boolean(value) => query.bind(value),
                            Parameter::Integer(value) => query.bind(value),
                            Parameter::Text(value) => query.bind(value),
                            Parameter::Bytes(value) => query.bind(value),
                        };
                    }
                }

                match query.execute(&mut *conn).await {
                    Ok(_) => executed += 1,
                    Err(e) if statement.options().continue_on_error => {
                        warn!(target_name = %self.target.name(), sql = %sql, error = %e, "Statement failed, continuing");
                    }
                    Err(source) => {
                        return Err(DeployError::Execution {
                            target: self.target.name().to_string(),
                            sql,
                            source,
                        });
                    }
                }
            }
        }

        Ok(ChangeOutcome::Applied { executed, skipped })
    }

    fn compile(&self, change: &Change) -> Result<Vec<Statement>> {
        let statements = change.compile(self.target.dialect())?;
        if !self.ctx.config.skip_on_unsupported {
            return Ok(statements);
        }
        Ok(statements
            .into_iter()
            .map(|s| s.skip_on_unsupported(true))
            .collect())
    }

    /// Renders a statement, or returns `None` if it is unsupported and
    /// marked skippable.
    fn generate(&self, statement: &Statement) -> Result<Option<Vec<Sql>>> {
        let dialect = self.target.dialect();
        match self.ctx.changes.generators().generate_sql(statement, dialect) {
            Ok(sql) => Ok(Some(sql)),
            Err(e) if e.is_unsupported() && statement.options().skip_on_unsupported => {
                warn!(kind = %statement.kind(), dialect = dialect.name(), "Skipping unsupported statement");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn parameters(&self, insert: &PreparedInsert) -> Result<Vec<Parameter>> {
        let mut parameters = Vec::new();
        for value in insert.parameters() {
            let parameter = match value {
                None | Some(ColumnValue::Null) => Parameter::Null,
                Some(ColumnValue::Boolean(b)) => Parameter::Boolean(*b),
                Some(ColumnValue::Integer(i)) => Parameter::Integer(*i),
                Some(
                    ColumnValue::Numeric(s)
                    | ColumnValue::String(s)
                    | ColumnValue::Date(s)
                    | ColumnValue::DateTime(s),
                ) => Parameter::Text(s.clone()),
                Some(ColumnValue::BlobFile(path)) => {
                    Parameter::Bytes(tokio::fs::read(self.resolve(path)).await?)
                }
                Some(ColumnValue::ClobFile(path)) => {
                    Parameter::Text(tokio::fs::read_to_string(self.resolve(path)).await?)
                }
                Some(
                    ColumnValue::Computed(_)
                    | ColumnValue::CurrentTimestamp
                    | ColumnValue::SequenceNext(_)
                    | ColumnValue::SequenceCurrent(_),
                ) => continue,
            };
            parameters.push(parameter);
        }
        Ok(parameters)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.resource_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
