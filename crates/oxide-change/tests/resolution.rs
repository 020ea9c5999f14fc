//! Generator selection and per-dialect conformance.

mod common;
use common::*;

use oxide_change::conformance::{ConformanceCase, Outcome};
use oxide_change::error::RenderError;
use oxide_change::prelude::*;
use oxide_change::statement::{CreateSequence, DropTable};
use oxide_change::template::expand;

struct Labelled {
    label: &'static str,
    priority: i32,
}

impl Generator for Labelled {
    fn name(&self) -> &'static str {
        self.label
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropTable
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn validate(&self, _statement: &Statement, _dialect: &Dialect) -> ValidationErrors {
        ValidationErrors::new()
    }

    fn generate(&self, _statement: &Statement, _dialect: &Dialect) -> Result<Vec<Sql>, RenderError> {
        Ok(vec![format!("-- {}", self.label)])
    }
}

fn drop_orders() -> Statement {
    DropTable {
        table: TableRef::new("orders"),
        cascade: false,
        if_exists: false,
    }
    .into()
}

#[test]
fn test_higher_priority_generator_renders() {
    let mut generators = GeneratorRegistry::standard();
    generators.register(Labelled {
        label: "ten",
        priority: 10,
    });
    generators.register(Labelled {
        label: "five",
        priority: 5,
    });
    let sqlite = DialectRegistry::standard().require("sqlite").unwrap();

    let sql = generators.generate_sql(&drop_orders(), &sqlite).unwrap();
    assert_eq!(sql, vec!["-- ten".to_string()]);
}

#[test]
fn test_equal_priority_resolves_to_first_registered() {
    let mut generators = GeneratorRegistry::new();
    generators.register(Labelled {
        label: "alpha",
        priority: PRIORITY_DATABASE,
    });
    generators.register(Labelled {
        label: "beta",
        priority: PRIORITY_DATABASE,
    });
    let sqlite = DialectRegistry::standard().require("sqlite").unwrap();

    for _ in 0..5 {
        let sql = generators.generate_sql(&drop_orders(), &sqlite).unwrap();
        assert_eq!(sql, vec!["-- alpha".to_string()]);
    }
}

#[test]
fn test_rendering_is_deterministic_for_every_dialect() {
    let ctx = ChangeContext::standard();
    for dialect in ctx.dialects().iter() {
        let first = ctx.generators().generate_sql(&drop_orders(), dialect).unwrap();
        let second = ctx.generators().generate_sql(&drop_orders(), dialect).unwrap();
        assert_eq!(first, second, "{dialect}");
    }
}

#[test]
fn test_template_resolves_for_backtick_dialect() {
    assert_eq!(
        expand("insert into [foo] (col) values (NOW())", &backtick_dialect()),
        "insert into `foo` (col) values (CURRENT_TIMESTAMP)"
    );
}

#[test]
fn test_unsupported_dialect_excluded_without_aborting_others() {
    let ctx = ChangeContext::standard();
    let case = ConformanceCase::new(CreateSequence {
        sequence: TableRef::new("order_seq"),
        start: Some(1),
        increment: None,
    })
    .expect("create sequence [order_seq] start with 1");

    let report = case.run(&ctx);
    match report.outcome("sqlite") {
        Some(Outcome::Skipped { reason }) => assert!(reason.is_unsupported()),
        other => panic!("expected sqlite to be skipped, got {other:?}"),
    }
    assert!(report.outcome("postgresql").is_some_and(Outcome::is_passed));
    assert!(report.outcome("informix").is_some_and(Outcome::is_passed));
    assert!(!report.tested().contains(&"sqlite"));
    assert!(report.all_passed());
}

#[test]
fn test_invalid_statement_reports_field_errors() {
    let ctx = ChangeContext::standard();
    let mssql = ctx.dialects().require("mssql").unwrap();
    let statement: Statement = DropTable {
        table: TableRef::new("orders"),
        cascade: true,
        if_exists: false,
    }
    .into();

    match ctx.generators().generate_sql(&statement, &mssql) {
        Err(ResolveError::Invalid { errors, .. }) => {
            assert!(errors.has_error_for("cascadeConstraints"));
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
    assert!(ctx.generators().supports_statement(&statement, &mssql));
    assert!(ctx
        .generators()
        .validate_statement(&statement, &mssql)
        .has_errors());
}
