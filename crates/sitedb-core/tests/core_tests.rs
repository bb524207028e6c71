use std::fs;

use sitedb_core::loader::{load_collection, try_load_collection};
use sitedb_core::types::{CollectionKind, Field};
use tempfile::TempDir;

#[test]
fn loads_projects_and_assigns_indexes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("projects.json");
    fs::write(
        &path,
        r#"{"projects": [
            {"title": "San Antonio River Bridge", "location": "San Antonio, TX", "features": ["Bridges"]},
            {"title": "Bridge Maintenance", "location": "Phoenix, AZ", "value": "$12 million"}
        ]}"#,
    )
    .unwrap();

    let docs = load_collection(&path, CollectionKind::Projects);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].index, 0);
    assert_eq!(docs[1].index, 1);
    assert_eq!(docs[1].text(Field::Value).as_deref(), Some("$12 million"));
}

#[test]
fn missing_file_degrades_to_empty() {
    let tmp = TempDir::new().unwrap();
    let docs = load_collection(&tmp.path().join("awards.json"), CollectionKind::Awards);
    assert!(docs.is_empty());
}

#[test]
fn corrupt_file_degrades_but_strict_load_errors() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("awards.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(load_collection(&path, CollectionKind::Awards).is_empty());
    let err = try_load_collection(&path, CollectionKind::Awards).unwrap_err();
    assert!(format!("{err:#}").contains("awards.json"));
}

#[test]
fn file_without_collection_key_is_empty() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("awards.json");
    fs::write(&path, r#"{"projects": [{"title": "Wrong file"}]}"#).unwrap();
    assert!(try_load_collection(&path, CollectionKind::Awards).unwrap().is_empty());
}
