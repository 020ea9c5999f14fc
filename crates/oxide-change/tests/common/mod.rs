//! Shared helpers for integration tests.

#![allow(dead_code)]

use oxide_change::dialect::Capabilities;
use oxide_change::prelude::*;

/// A dialect that cannot generate column values itself.
pub fn manual_key_dialect() -> Dialect {
    Dialect::builder("manualkeys")
        .url_schemes(&["manualkeys"])
        .capabilities(Capabilities {
            auto_increment: false,
            ..Capabilities::default()
        })
        .build()
}

/// A dialect quoting with backticks whose timestamp is `CURRENT_TIMESTAMP`.
pub fn backtick_dialect() -> Dialect {
    Dialect::builder("backtick")
        .quotes('`', '`')
        .current_timestamp("CURRENT_TIMESTAMP")
        .build()
}

/// `users(id = 1 auto-increment, name = "a")`.
pub fn users_change() -> Change {
    InsertDataChange::new("users")
        .column(
            ColumnConfig::new("id")
                .with_value(ColumnValue::Integer(1))
                .auto_increment(),
        )
        .column(ColumnConfig::new("name").with_value(ColumnValue::String("a".into())))
        .into()
}

/// Compiles and renders a change's single statement.
pub fn render(ctx: &ChangeContext, change: &Change, dialect: &Dialect) -> Vec<String> {
    let statements = change.compile(dialect).expect("change compiles");
    assert_eq!(statements.len(), 1, "expected exactly one statement");
    ctx.generators()
        .generate_sql(&statements[0], dialect)
        .expect("statement renders")
}
