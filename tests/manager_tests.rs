mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use common::Note;
use sqlite_orm::{
    Action, Filter, Manager, Query, Record, SortTerm, SqliteEngine, StoreError, Value,
};

fn manager() -> Result<Manager> {
    let engine = SqliteEngine::open_in_memory()?;
    let manager = Manager::new(Arc::new(engine));
    manager.create_table(&Note::table_definition())?;
    Ok(manager)
}

#[test]
fn create_table_and_existence_check() -> Result<()> {
    let engine = SqliteEngine::open_in_memory()?;
    let manager = Manager::new(Arc::new(engine));
    assert!(!manager.table_exists("notes")?);
    manager.create_table(&Note::table_definition())?;
    assert!(manager.table_exists("notes")?);
    Ok(())
}

#[test]
fn create_existing_table_fails_without_if_not_exists() -> Result<()> {
    let manager = manager()?;
    let err = manager.create_table(&Note::table_definition()).unwrap_err();
    assert!(matches!(err, StoreError::TableExists(name) if name == "notes"));

    // The same definition with if_not_exists is accepted.
    manager.create_table(&Note::table_definition().if_not_exists())?;
    Ok(())
}

#[test]
fn insert_and_fetch_round_trip() -> Result<()> {
    let manager = manager()?;
    let note = Note::new("n1", "first", 1_700_000_000);
    manager.add(&note)?;

    let fetched: Vec<Note> = manager.fetch_all()?;
    assert_eq!(fetched.len(), 1);
    let got = &fetched[0];
    assert_eq!(got.id, note.id);
    assert_eq!(got.title, note.title);
    assert_eq!(got.rating, note.rating);
    let drift = (got.created_at - note.created_at).num_seconds().abs();
    assert!(drift <= 1, "created_at drifted by {drift}s");
    Ok(())
}

#[test]
fn batch_insert_filter_sort_and_limit() -> Result<()> {
    let manager = manager()?;
    let notes = vec![
        Note {
            rating: Some(5),
            ..Note::new("a", "alpha", 100)
        },
        Note {
            rating: Some(3),
            ..Note::new("b", "beta", 200)
        },
        Note {
            rating: Some(1),
            ..Note::new("c", "gamma", 300)
        },
    ];
    manager.add_all(&notes)?;

    let rated: Vec<Note> = manager.fetch(
        vec![Filter::greater_than("rating", 2i64)],
        vec![SortTerm::desc("rating")],
        None,
        None,
    )?;
    assert_eq!(
        rated.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );

    let limited: Vec<Note> = manager.fetch(
        Vec::new(),
        vec![SortTerm::asc("id")],
        Some(2),
        Some(1),
    )?;
    assert_eq!(
        limited.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
        vec!["b", "c"]
    );
    Ok(())
}

#[test]
fn delete_single_and_batch() -> Result<()> {
    let manager = manager()?;
    let notes = vec![
        Note::new("a", "alpha", 100),
        Note::new("b", "beta", 200),
        Note::new("c", "gamma", 300),
    ];
    manager.add_all(&notes)?;

    manager.delete(&notes[0])?;
    assert_eq!(manager.fetch_all::<Note>()?.len(), 2);

    manager.delete_all(&notes[1..])?;
    assert!(manager.fetch_all::<Note>()?.is_empty());

    // Deleting an empty batch is a no-op, not an error.
    manager.delete_all::<Note>(&[])?;
    Ok(())
}

#[test]
fn empty_in_set_filter_matches_no_rows() -> Result<()> {
    let manager = manager()?;
    manager.add(&Note::new("a", "alpha", 100))?;
    let none: Vec<Note> = manager.fetch(
        vec![Filter::in_set("id", Vec::new())],
        Vec::new(),
        None,
        None,
    )?;
    assert!(none.is_empty());
    Ok(())
}

#[test]
fn upsert_updates_non_conflict_columns() -> Result<()> {
    let manager = manager()?;
    manager.add(&Note {
        rating: Some(2),
        ..Note::new("n1", "before", 100)
    })?;

    let replacement = Note {
        rating: Some(5),
        ..Note::new("n1", "after", 100)
    };
    let query = Query::new(
        Note::table_name(),
        Action::Upsert {
            values: replacement.to_storage_values()?,
            conflict_columns: vec!["id".to_string()],
            update_columns: None,
        },
    );
    manager.write(&query)?;

    let fetched: Vec<Note> = manager.fetch_all()?;
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].title, "after");
    assert_eq!(fetched[0].rating, Some(5));
    Ok(())
}

#[test]
fn raw_read_returns_row_data() -> Result<()> {
    let manager = manager()?;
    manager.add(&Note::new("n1", "raw", 100))?;

    let rows = manager.read(&Query::new(
        "notes",
        Action::Select {
            fields: Some(vec!["id".into(), "title".into()]),
            filters: vec![Filter::equals("id", "n1")],
            sort: Vec::new(),
            limit: None,
            offset: None,
        },
    ))?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].column_names().to_vec(), vec!["id", "title"]);
    assert_eq!(rows[0].get("title"), Some(&Value::Text("raw".into())));
    Ok(())
}

#[test]
fn raw_write_reports_affected_rows() -> Result<()> {
    let manager = manager()?;
    manager.add_all(&[Note::new("a", "x", 1), Note::new("b", "x", 2)])?;

    let mut values = BTreeMap::new();
    values.insert("title".to_string(), Value::Text("y".into()));
    let affected = manager.write(&Query::new(
        "notes",
        Action::Update {
            values,
            filters: Vec::new(),
        },
    ))?;
    assert_eq!(affected, 2);
    Ok(())
}

#[test]
fn data_persists_across_reopen() -> Result<()> {
    let file = tempfile::NamedTempFile::new()?;
    {
        let manager = Manager::new(Arc::new(SqliteEngine::open(file.path())?));
        manager.create_table(&Note::table_definition())?;
        manager.add(&Note::new("n1", "durable", 1_700_000_000))?;
    }
    let manager = Manager::new(Arc::new(SqliteEngine::open(file.path())?));
    let fetched: Vec<Note> = manager.fetch_all()?;
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].title, "durable");
    Ok(())
}
