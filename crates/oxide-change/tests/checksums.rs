//! Checksum stability across compilation paths.

mod common;
use common::*;

use oxide_change::prelude::*;

#[test]
fn test_unchanged_change_reproduces_checksum() {
    let dialects = DialectRegistry::standard();
    for dialect in dialects.iter() {
        let a = checksum(&users_change(), dialect).unwrap();
        let b = checksum(&users_change(), dialect).unwrap();
        assert_eq!(a, b, "{dialect}");
        assert!(a.to_string().starts_with("1:"));
    }
}

#[test]
fn test_generated_column_does_not_affect_checksum_on_auto_increment_dialects() {
    let sqlite = DialectRegistry::standard().require("sqlite").unwrap();
    let without_id: Change = InsertDataChange::new("users")
        .column(ColumnConfig::new("name").with_value(ColumnValue::String("a".into())))
        .into();

    assert_eq!(
        checksum(&users_change(), &sqlite).unwrap(),
        checksum(&without_id, &sqlite).unwrap()
    );

    let manual = manual_key_dialect();
    assert_ne!(
        checksum(&users_change(), &manual).unwrap(),
        checksum(&without_id, &manual).unwrap()
    );
}

#[test]
fn test_prepared_path_hashes_raw_columns() {
    let sqlite = DialectRegistry::standard().require("sqlite").unwrap();
    let with_id: Change = InsertDataChange::new("docs")
        .column(
            ColumnConfig::new("id")
                .with_value(ColumnValue::Integer(1))
                .auto_increment(),
        )
        .column(ColumnConfig::new("body").with_value(ColumnValue::ClobFile("a.txt".into())))
        .into();
    let other_id: Change = InsertDataChange::new("docs")
        .column(
            ColumnConfig::new("id")
                .with_value(ColumnValue::Integer(2))
                .auto_increment(),
        )
        .column(ColumnConfig::new("body").with_value(ColumnValue::ClobFile("a.txt".into())))
        .into();

    assert_ne!(
        checksum(&with_id, &sqlite).unwrap(),
        checksum(&other_id, &sqlite).unwrap()
    );
}

#[test]
fn test_changeset_checksum_tracks_its_changes() {
    let sqlite = DialectRegistry::standard().require("sqlite").unwrap();
    let base = ChangeSet::new("1", "ada", "changelog.json").change(users_change());
    let edited = ChangeSet::new("1", "ada", "changelog.json").change(
        InsertDataChange::new("users")
            .column(ColumnConfig::new("name").with_value(ColumnValue::String("b".into()))),
    );

    let stored = changeset_checksum(&base, &sqlite).unwrap();
    assert_eq!(stored, changeset_checksum(&base.clone(), &sqlite).unwrap());
    let drifted = changeset_checksum(&edited, &sqlite).unwrap();
    assert_ne!(stored, drifted);

    let err = oxide_change::checksum::verify(&base.identity(), &stored.to_string(), &drifted)
        .unwrap_err();
    assert!(err.to_string().contains("changelog.json::1::ada"));
}
