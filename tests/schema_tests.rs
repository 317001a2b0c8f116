use sqlite_orm::{ColumnDefinition, ColumnType, TableDefinition, Value};

#[test]
fn create_sql_renders_columns_and_constraints() {
    let table = TableDefinition::new("notes")
        .column(ColumnDefinition::new("id", ColumnType::Text).primary_key())
        .column(ColumnDefinition::new("title", ColumnType::Text).not_null())
        .column(ColumnDefinition::new("slug", ColumnType::Text).unique())
        .column(
            ColumnDefinition::new("score", ColumnType::Integer).default_value(Value::Integer(0)),
        );
    assert_eq!(
        table.create_sql(),
        "CREATE TABLE notes (id TEXT PRIMARY KEY, title TEXT NOT NULL, \
         slug TEXT UNIQUE, score INTEGER DEFAULT 0)"
    );
}

#[test]
fn create_sql_renders_every_option() {
    let table = TableDefinition::new("scratch")
        .column(ColumnDefinition::new("id", ColumnType::Text).primary_key())
        .if_not_exists()
        .temporary()
        .without_rowid()
        .strict();
    assert_eq!(
        table.create_sql(),
        "CREATE TEMPORARY TABLE IF NOT EXISTS scratch (id TEXT PRIMARY KEY) \
         WITHOUT ROWID, STRICT"
    );
}

#[test]
fn text_defaults_are_quoted_and_escaped() {
    let table = TableDefinition::new("t").column(
        ColumnDefinition::new("name", ColumnType::Text)
            .default_value(Value::Text("it's".into())),
    );
    assert_eq!(
        table.create_sql(),
        "CREATE TABLE t (name TEXT DEFAULT 'it''s')"
    );
}

#[test]
fn column_lookup_by_name() {
    let table = TableDefinition::new("t")
        .column(ColumnDefinition::new("a", ColumnType::Integer))
        .column(ColumnDefinition::new("b", ColumnType::Date));
    assert_eq!(table.column_type("b"), Some(ColumnType::Date));
    assert_eq!(table.column_type("c"), None);
    assert!(table.column_def("a").is_some());
}

#[test]
#[should_panic(expected = "duplicate column")]
fn duplicate_column_names_are_rejected() {
    let _ = TableDefinition::new("t")
        .column(ColumnDefinition::new("a", ColumnType::Integer))
        .column(ColumnDefinition::new("a", ColumnType::Text));
}

#[test]
fn sql_type_names_round_trip_through_substring_match() {
    for ty in [
        ColumnType::Text,
        ColumnType::Integer,
        ColumnType::Real,
        ColumnType::Double,
        ColumnType::Numeric,
        ColumnType::Boolean,
        ColumnType::Date,
        ColumnType::Blob,
        ColumnType::Any,
    ] {
        assert_eq!(ColumnType::from_sql_type(ty.sql_type()), ty);
    }
}

#[test]
fn from_sql_type_matches_common_declarations() {
    assert_eq!(ColumnType::from_sql_type("VARCHAR(80)"), ColumnType::Text);
    assert_eq!(ColumnType::from_sql_type("BIGINT"), ColumnType::Integer);
    assert_eq!(ColumnType::from_sql_type("FLOAT"), ColumnType::Real);
    assert_eq!(ColumnType::from_sql_type("DECIMAL(10,2)"), ColumnType::Numeric);
    assert_eq!(ColumnType::from_sql_type("DATETIME"), ColumnType::Date);
    assert_eq!(ColumnType::from_sql_type("mystery"), ColumnType::Text);
}
