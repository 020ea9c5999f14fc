//! Insert compilation across dialects.

mod common;
use common::*;

use oxide_change::prelude::*;

#[test]
fn test_auto_increment_column_dropped_where_database_generates_it() {
    let ctx = ChangeContext::standard();
    let sqlite = ctx.dialects().require("sqlite").unwrap();

    let statements = users_change().compile(&sqlite).unwrap();
    let insert = statements[0].as_insert().unwrap();
    let columns: Vec<_> = insert.values.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(columns, vec!["name"]);

    assert_eq!(
        render(&ctx, &users_change(), &sqlite),
        vec![r#"INSERT INTO "users" ("name") VALUES ('a')"#.to_string()]
    );
}

#[test]
fn test_auto_increment_column_kept_where_database_cannot_generate_it() {
    let mut dialects = DialectRegistry::standard();
    let manual = dialects.register(manual_key_dialect()).unwrap();
    let ctx = ChangeContext::new(dialects, GeneratorRegistry::standard());

    let statements = users_change().compile(&manual).unwrap();
    let insert = statements[0].as_insert().unwrap();
    let columns: Vec<_> = insert.values.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(columns, vec!["id", "name"]);

    assert_eq!(
        render(&ctx, &users_change(), &manual),
        vec![r#"INSERT INTO "users" ("id", "name") VALUES (1, 'a')"#.to_string()]
    );
}

#[test]
fn test_clob_declared_type_takes_prepared_path() {
    let ctx = ChangeContext::standard();
    let change: Change = InsertDataChange::new("documents")
        .column(ColumnConfig::new("id").with_value(ColumnValue::Integer(1)))
        .column(
            ColumnConfig::new("body")
                .with_type("CLOB")
                .with_value(ColumnValue::String("long text".into())),
        )
        .into();

    for dialect in ctx.dialects().iter() {
        let statements = change.compile(dialect).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].kind(), StatementKind::PreparedInsert, "{dialect}");
        assert!(statements[0].as_insert().is_none());
    }

    let postgres = ctx.dialects().require("postgresql").unwrap();
    assert_eq!(
        render(&ctx, &change, &postgres),
        vec![r#"INSERT INTO "documents" ("id", "body") VALUES ($1, $2)"#.to_string()]
    );
}

#[test]
fn test_one_file_column_forces_whole_insert_onto_prepared_path() {
    let ctx = ChangeContext::standard();
    let sqlite = ctx.dialects().require("sqlite").unwrap();
    let change: Change = InsertDataChange::new("images")
        .column(
            ColumnConfig::new("id")
                .with_value(ColumnValue::Integer(1))
                .auto_increment(),
        )
        .column(ColumnConfig::new("created").with_value(ColumnValue::CurrentTimestamp))
        .column(ColumnConfig::new("data").with_value(ColumnValue::BlobFile("logo.png".into())))
        .into();

    let statements = change.compile(&sqlite).unwrap();
    let prepared = statements[0].as_prepared_insert().unwrap();
    // Raw columns: the auto-increment column is not dropped on this path.
    assert_eq!(prepared.columns.len(), 3);
    assert_eq!(
        render(&ctx, &change, &sqlite),
        vec![r#"INSERT INTO "images" ("id", "created", "data") VALUES (?, CURRENT_TIMESTAMP, ?)"#
            .to_string()]
    );
}

#[test]
fn test_live_clob_column_detected_only_where_introspection_is_needed() {
    let ctx = ChangeContext::standard();
    let change: Change = InsertDataChange::new("notes")
        .column(ColumnConfig::new("body").with_value(ColumnValue::String("x".into())))
        .into();
    let snapshot = |_: &TableRef, column: &str| (column == "body").then_some(DataType::Clob);

    let informix = ctx.dialects().require("informix").unwrap();
    let statements = change.compile_with(&informix, &snapshot).unwrap();
    assert_eq!(statements[0].kind(), StatementKind::PreparedInsert);

    let postgres = ctx.dialects().require("postgresql").unwrap();
    let statements = change.compile_with(&postgres, &snapshot).unwrap();
    assert_eq!(statements[0].kind(), StatementKind::Insert);
}

#[test]
fn test_sequence_values_bound_to_change_schema() {
    let ctx = ChangeContext::standard();
    let postgres = ctx.dialects().require("postgresql").unwrap();
    let change: Change = InsertDataChange::new("orders")
        .in_schema("sales")
        .column(
            ColumnConfig::new("id")
                .with_value(ColumnValue::SequenceNext(SequenceRef::new("order_seq"))),
        )
        .into();

    assert_eq!(
        render(&ctx, &change, &postgres),
        vec![
            r#"INSERT INTO "sales"."orders" ("id") VALUES (nextval('"sales"."order_seq"'))"#
                .to_string()
        ]
    );
}

#[test]
fn test_column_prologue_and_epilogue_wrap_statement() {
    let ctx = ChangeContext::standard();
    let sqlite = ctx.dialects().require("sqlite").unwrap();
    let change: Change = InsertDataChange::new("t")
        .column(
            ColumnConfig::new("a")
                .with_value(ColumnValue::Integer(1))
                .with_prologue("/* first */"),
        )
        .column(
            ColumnConfig::new("b")
                .with_value(ColumnValue::Integer(2))
                .with_prologue("/* second */")
                .with_epilogue(";"),
        )
        .into();

    assert_eq!(
        render(&ctx, &change, &sqlite),
        vec![r#"/* second */ INSERT INTO "t" ("a", "b") VALUES (1, 2) ;"#.to_string()]
    );
}

#[test]
fn test_missing_fields_reported_as_configuration_error() {
    let sqlite = DialectRegistry::standard().require("sqlite").unwrap();
    let change: Change = InsertDataChange::new("users").into();
    let err = change.compile(&sqlite).unwrap_err();
    assert_eq!(err.to_string(), "invalid insertData change: columns: is required");
}
