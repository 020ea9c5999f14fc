//! Per-dialect conformance runs.
//!
//! A [`ConformanceCase`] pairs one statement with its expected SQL, written
//! as dialect-neutral [templates](crate::template). Running the case renders
//! the statement for every selected dialect and compares lower-cased,
//! trimmed text. Each dialect gets its own outcome; one failing or
//! unsupported dialect never stops the others.

use std::fmt;

use tracing::debug;

use crate::context::ChangeContext;
use crate::dialect::Dialect;
use crate::error::ResolveError;
use crate::statement::Statement;
use crate::template::expand;

/// What happened for one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rendered SQL matched.
    Passed,
    /// No generator was eligible; the dialect is excluded for this statement.
    Skipped {
        /// The resolution failure.
        reason: ResolveError,
    },
    /// A fragment differs.
    Mismatch {
        /// Fragment index.
        index: usize,
        /// Expanded, normalized expectation.
        expected: String,
        /// Normalized rendering.
        actual: String,
    },
    /// A different number of fragments was rendered.
    CountMismatch {
        /// Expected fragment count.
        expected: usize,
        /// Rendered fragment count.
        actual: usize,
    },
    /// The selected generator failed while rendering.
    Failed {
        /// The render failure.
        reason: ResolveError,
    },
}

impl Outcome {
    /// Returns true for [`Outcome::Passed`].
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns true for [`Outcome::Skipped`].
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("passed"),
            Self::Skipped { reason } => write!(f, "skipped ({reason})"),
            Self::Mismatch {
                index,
                expected,
                actual,
            } => write!(f, "fragment {index}: expected `{expected}`, got `{actual}`"),
            Self::CountMismatch { expected, actual } => {
                write!(f, "expected {expected} fragments, got {actual}")
            }
            Self::Failed { reason } => write!(f, "failed ({reason})"),
        }
    }
}

/// Outcomes of one case, by dialect in registration order.
#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    outcomes: Vec<(&'static str, Outcome)>,
}

impl ConformanceReport {
    /// Returns every outcome.
    #[must_use]
    pub fn outcomes(&self) -> &[(&'static str, Outcome)] {
        &self.outcomes
    }

    /// Returns the outcome for a dialect, if it was run.
    #[must_use]
    pub fn outcome(&self, dialect: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| *name == dialect)
            .map(|(_, outcome)| outcome)
    }

    /// Returns the dialects that were actually tested.
    #[must_use]
    pub fn tested(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_skipped())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Returns true if no tested dialect failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, o)| o.is_passed() || o.is_skipped())
    }
}

/// One statement and the SQL it should render to.
#[derive(Debug, Clone)]
pub struct ConformanceCase {
    statement: Statement,
    expected: Vec<String>,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl ConformanceCase {
    /// Starts a case for a statement.
    #[must_use]
    pub fn new(statement: impl Into<Statement>) -> Self {
        Self {
            statement: statement.into(),
            expected: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Adds an expected fragment template.
    #[must_use]
    pub fn expect(mut self, template: impl Into<String>) -> Self {
        self.expected.push(template.into());
        self
    }

    /// Restricts the run to the named dialects.
    #[must_use]
    pub fn include(mut self, dialect: impl Into<String>) -> Self {
        self.include.push(dialect.into());
        self
    }

    /// Leaves the named dialect out of the run.
    #[must_use]
    pub fn exclude(mut self, dialect: impl Into<String>) -> Self {
        self.exclude.push(dialect.into());
        self
    }

    fn selects(&self, dialect: &Dialect) -> bool {
        let named = |list: &[String]| list.iter().any(|n| n.eq_ignore_ascii_case(dialect.name()));
        (self.include.is_empty() || named(&self.include)) && !named(&self.exclude)
    }

    /// Runs the case against every selected dialect in the context.
    #[must_use]
    pub fn run(&self, ctx: &ChangeContext) -> ConformanceReport {
        let mut report = ConformanceReport::default();
        for dialect in ctx.dialects().iter().filter(|d| self.selects(d)) {
            let outcome = self.run_one(ctx, dialect);
            debug!(dialect = dialect.name(), outcome = %outcome, "Conformance outcome");
            report.outcomes.push((dialect.name(), outcome));
        }
        report
    }

    fn run_one(&self, ctx: &ChangeContext, dialect: &Dialect) -> Outcome {
        let fragments = match ctx.generators().generate_sql(&self.statement, dialect) {
            Ok(fragments) => fragments,
            Err(reason @ (ResolveError::Unsupported { .. } | ResolveError::Invalid { .. })) => {
                return Outcome::Skipped { reason };
            }
            Err(reason) => return Outcome::Failed { reason },
        };

        if fragments.len() != self.expected.len() {
            return Outcome::CountMismatch {
                expected: self.expected.len(),
                actual: fragments.len(),
            };
        }

        for (index, (template, actual)) in self.expected.iter().zip(&fragments).enumerate() {
            let expected = normalize(&expand(template, dialect));
            let actual = normalize(actual);
            if expected != actual {
                return Outcome::Mismatch {
                    index,
                    expected,
                    actual,
                };
            }
        }
        Outcome::Passed
    }
}

fn normalize(sql: &str) -> String {
    sql.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{CreateSequence, DropTable, TableRef};

    #[test]
    fn test_drop_table_on_every_dialect() {
        let ctx = ChangeContext::standard();
        let report = ConformanceCase::new(DropTable {
            table: TableRef::new("orders"),
            cascade: false,
            if_exists: false,
        })
        .expect("DROP TABLE [orders]")
        .run(&ctx);

        assert_eq!(report.outcomes().len(), ctx.dialects().len());
        assert!(report.all_passed(), "{report:?}");
        assert_eq!(report.tested().len(), ctx.dialects().len());
    }

    #[test]
    fn test_unsupported_dialects_are_skipped() {
        let ctx = ChangeContext::standard();
        let report = ConformanceCase::new(CreateSequence {
            sequence: TableRef::new("s"),
            start: None,
            increment: None,
        })
        .expect("create sequence [s]")
        .run(&ctx);

        assert!(report.outcome("sqlite").is_some_and(Outcome::is_skipped));
        assert!(report.outcome("mysql").is_some_and(Outcome::is_skipped));
        assert!(report.outcome("postgresql").is_some_and(Outcome::is_passed));
        assert!(report.outcome("mssql").is_some_and(Outcome::is_passed));
        assert!(report.all_passed());
    }

    #[test]
    fn test_include_and_exclude() {
        let ctx = ChangeContext::standard();
        let statement = DropTable {
            table: TableRef::new("t"),
            cascade: false,
            if_exists: false,
        };
        let report = ConformanceCase::new(statement.clone())
            .expect("drop table [t]")
            .include("sqlite")
            .include("mysql")
            .exclude("mysql")
            .run(&ctx);
        assert_eq!(report.tested(), vec!["sqlite"]);

        let report = ConformanceCase::new(statement)
            .expect("drop table [t]")
            .expect("vacuum")
            .include("sqlite")
            .run(&ctx);
        assert_eq!(
            report.outcome("sqlite"),
            Some(&Outcome::CountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_mismatch_reported() {
        let ctx = ChangeContext::standard();
        let report = ConformanceCase::new(DropTable {
            table: TableRef::new("t"),
            cascade: false,
            if_exists: false,
        })
        .expect("drop table [other]")
        .include("postgresql")
        .run(&ctx);
        assert!(matches!(
            report.outcome("postgresql"),
            Some(Outcome::Mismatch { index: 0, .. })
        ));
        assert!(!report.all_passed());
    }
}
