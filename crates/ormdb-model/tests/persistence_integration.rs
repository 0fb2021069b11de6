//! Integration tests for on-disk persistence.

use ormdb_model::{CallOptions, Database, EntityDef, FieldDef, Row, ScalarType, StorageConfig, Value};

fn article() -> EntityDef {
    EntityDef::new("article", "id")
        .with_field(FieldDef::scalar("id", ScalarType::Int64).auto_increment())
        .with_field(FieldDef::scalar("slug", ScalarType::String))
        .with_field(FieldDef::optional_scalar("views", ScalarType::Int64))
}

fn open(dir: &tempfile::TempDir) -> Database {
    let config = StorageConfig::new(dir.path()).with_flush_every_ms(None);
    let db = Database::open(config).unwrap();
    db.define(article()).unwrap();
    db
}

#[test]
fn test_rows_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let opts = CallOptions::new();

    {
        let db = open(&dir);
        db.create("article", Row::new().with("slug", "first"), &opts)
            .unwrap();
        db.create("article", Row::new().with("slug", "second"), &opts)
            .unwrap();
        db.flush().unwrap();
    }

    let db = open(&dir);
    let all = db.find_all("article", &Row::new(), &opts).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].get("slug"), Some(&Value::from("first")));
    assert_eq!(all[0].get("views"), Some(&Value::Null));

    let third = db
        .create("article", Row::new().with("slug", "third"), &opts)
        .unwrap();
    assert_eq!(third.id(), &Value::Int(3));
}

#[test]
fn test_find_all_filters() {
    let db = Database::temporary().unwrap();
    db.define(article()).unwrap();
    let opts = CallOptions::new();

    for (slug, views) in [("a", 1), ("b", 2), ("c", 1)] {
        db.create(
            "article",
            Row::new().with("slug", slug).with("views", views),
            &opts,
        )
        .unwrap();
    }

    let hits = db
        .find_all("article", &Row::new().with("views", 1), &opts)
        .unwrap();
    let slugs: Vec<_> = hits.iter().map(|i| i.get("slug").cloned().unwrap()).collect();
    assert_eq!(slugs, vec![Value::from("a"), Value::from("c")]);
}
