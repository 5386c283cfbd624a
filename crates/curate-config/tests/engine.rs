//! Config engine behaviour on the built-in dataset and edition kinds.

use curate_config::{ConfigError, MetadataConfig, RecordKind};
use curate_core::FieldValue;
use curate_schema::ModelCompiler;
use proptest::prelude::*;
use serde_json::{json, Value};

fn dataset_json() -> Value {
    json!({
        "id": "pop-est",
        "type": "static",
        "title": "Population estimates",
        "description": "Mid-year population estimates",
        "topic": "population",
        "last_updated": "2025-03-01T09:30:00Z",
        "contact": {"name": "Stats Team", "email": "stats@example.org"},
        "publisher": {"name": "ONS", "href": "https://example.org"}
    })
}

fn loaded_dataset() -> MetadataConfig {
    let mut compiler = ModelCompiler::new();
    let mut engine = MetadataConfig::dataset(&mut compiler).unwrap();
    engine.import_json(&dataset_json()).unwrap();
    engine
}

#[test]
fn test_load_json_and_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("dataset.json");
    std::fs::write(&json_path, dataset_json().to_string()).unwrap();
    let yaml_path = dir.path().join("dataset.yaml");
    std::fs::write(&yaml_path, serde_yaml::to_string(&dataset_json()).unwrap()).unwrap();

    let mut compiler = ModelCompiler::new();
    let mut from_json = MetadataConfig::dataset(&mut compiler).unwrap();
    from_json.load(&json_path).unwrap();
    let mut from_yaml = MetadataConfig::dataset(&mut compiler).unwrap();
    from_yaml.load(&yaml_path).unwrap();

    assert!(from_json.is_loaded());
    assert_eq!(from_json.metadata(), from_yaml.metadata());
}

#[test]
fn test_load_missing_file_is_not_found() {
    let mut compiler = ModelCompiler::new();
    let mut engine = MetadataConfig::dataset(&mut compiler).unwrap();
    let err = engine.load(std::path::Path::new("/nonexistent/curate/d.json")).unwrap_err();
    assert!(err.is_not_found());
    assert!(!engine.is_loaded());
}

#[test]
fn test_load_malformed_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"id\": ").unwrap();
    let mut compiler = ModelCompiler::new();
    let mut engine = MetadataConfig::dataset(&mut compiler).unwrap();
    let err = engine.load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Document(_)));
    assert!(!err.is_not_found());
}

#[test]
fn test_failed_import_leaves_record_unchanged() {
    let mut engine = loaded_dataset();
    let before = engine.metadata().clone();
    let mut bad = dataset_json();
    bad["type"] = json!("bogus");
    let err = engine.import_json(&bad).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert_eq!(engine.metadata(), &before);
}

#[test]
fn test_failed_first_import_leaves_engine_uninitialized() {
    let mut compiler = ModelCompiler::new();
    let mut engine = MetadataConfig::dataset(&mut compiler).unwrap();
    assert!(engine.import_json(&json!({"id": "x"})).is_err());
    assert!(!engine.is_loaded());
    assert!(engine.metadata().is_empty());
}

#[test]
fn test_set_commits_valid_value() {
    let mut engine = loaded_dataset();
    engine.set("title", "Revised estimates").unwrap();
    assert_eq!(engine.get("title").unwrap(), &FieldValue::from("Revised estimates"));
    engine.set("contact.telephone", "0123").unwrap();
    assert_eq!(engine.get("contact.telephone").unwrap(), &FieldValue::from("0123"));
}

#[test]
fn test_set_enum_normalizes_member() {
    let mut engine = loaded_dataset();
    engine.set("type", "filterable").unwrap();
    match engine.get("type").unwrap() {
        FieldValue::Enum(member) => assert_eq!(member.name, "FILTERABLE"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_set_invalid_value_rolls_back() {
    let mut engine = loaded_dataset();
    let err = engine.set("type", "bogus").unwrap_err();
    let ConfigError::Validation(validation) = err else {
        panic!("expected validation error");
    };
    assert!(validation.mentions("type"));
    match engine.get("type").unwrap() {
        FieldValue::Enum(member) => assert_eq!(member.value, "static"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_set_unknown_key_lists_valid_fields() {
    let mut engine = loaded_dataset();
    match engine.set("colour", "red").unwrap_err() {
        ConfigError::UnknownField { valid, .. } => {
            assert!(valid.contains(&"title".to_string()));
            assert!(valid.contains(&"file".to_string()));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_set_file_resolves_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("pop.csv");
    std::fs::write(&data, "a,b\n").unwrap();

    let mut engine = loaded_dataset();
    engine.set("file", data.display().to_string()).unwrap();
    assert_eq!(engine.get("file.format").unwrap(), &FieldValue::from("csv"));
    assert_eq!(engine.get("file.size").unwrap(), &FieldValue::Int(4));
}

#[test]
fn test_set_missing_file_is_not_found_and_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("pop.csv");
    std::fs::write(&data, "a,b\n").unwrap();
    let mut engine = loaded_dataset();
    engine.set("file", data.display().to_string()).unwrap();
    let before = engine.get("file").unwrap().clone();

    let err = engine
        .set("file", dir.path().join("missing.csv").display().to_string())
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(engine.get("file").unwrap(), &before);
}

#[test]
fn test_set_file_path_re_describes_file() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("pop.csv");
    std::fs::write(&csv, "a,b\n").unwrap();
    let xlsx = dir.path().join("pop.xlsx");
    std::fs::write(&xlsx, [0u8; 16]).unwrap();

    let mut engine = loaded_dataset();
    engine.set("file", csv.display().to_string()).unwrap();
    engine.set("file.path", xlsx.display().to_string()).unwrap();
    assert_eq!(
        engine.get("file.path").unwrap(),
        &FieldValue::from(xlsx.display().to_string())
    );
    assert_eq!(engine.get("file.format").unwrap(), &FieldValue::from("xlsx"));
    assert_eq!(engine.get("file.size").unwrap(), &FieldValue::Int(16));
}

#[test]
fn test_set_file_path_to_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("pop.csv");
    std::fs::write(&csv, "a,b\n").unwrap();
    let mut engine = loaded_dataset();
    engine.set("file", csv.display().to_string()).unwrap();
    let before = engine.get("file").unwrap().clone();

    let err = engine
        .set("file.path", "/nonexistent/curate/missing.csv")
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(engine.get("file").unwrap(), &before);
}

#[test]
fn test_file_descriptor_fields_are_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("pop.csv");
    std::fs::write(&csv, "a,b\n").unwrap();
    let mut engine = loaded_dataset();
    engine.set("file", csv.display().to_string()).unwrap();

    for key in ["file.format", "file.size"] {
        match engine.set(key, "xlsx").unwrap_err() {
            ConfigError::UnknownField { key: rejected, valid } => {
                assert_eq!(rejected, key);
                assert_eq!(valid, vec!["file", "file.path"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(engine.get("file.format").unwrap(), &FieldValue::from("csv"));
}

#[test]
fn test_import_resolves_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("pop.xlsx");
    std::fs::write(&data, [0u8; 16]).unwrap();
    let mut input = dataset_json();
    input["file"] = json!(data.display().to_string());

    let mut compiler = ModelCompiler::new();
    let mut engine = MetadataConfig::dataset(&mut compiler).unwrap();
    engine.import_json(&input).unwrap();
    assert_eq!(engine.get("file.format").unwrap(), &FieldValue::from("xlsx"));
    assert_eq!(engine.get("file.size").unwrap(), &FieldValue::Int(16));
}

#[test]
fn test_edition_does_not_resolve_files() {
    let mut compiler = ModelCompiler::new();
    let engine = MetadataConfig::edition(&mut compiler).unwrap();
    assert_eq!(engine.kind(), RecordKind::Edition);
    assert!(engine.get("file").is_err());
}

#[test]
fn test_export_writes_titled_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("exports/nested");
    let engine = loaded_dataset();
    let path = engine.export(&out_dir).unwrap();

    assert_eq!(path, out_dir.join("Population estimates_metadata.json"));
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["type"], "static");
    assert_eq!(written["last_updated"], "2025-03-01T09:30:00Z");
    assert_eq!(written["license"], "Open Government License v3.0");
}

#[test]
fn test_export_edition_uses_edition_title() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = ModelCompiler::new();
    let mut engine = MetadataConfig::edition(&mut compiler).unwrap();
    engine
        .import_json(&json!({
            "dataset_id": "pop-est",
            "edition": "2025",
            "edition_title": "Edition 2025",
            "release_date": "2025-06-01",
            "version": 1
        }))
        .unwrap();
    let path = engine.export(dir.path()).unwrap();
    assert!(path.ends_with("Edition 2025_metadata.json"));
}

proptest! {
    #[test]
    fn rejected_set_never_changes_the_record(bad in "[a-z]{1,12}") {
        prop_assume!(!["filterable", "static"].contains(&bad.as_str()));
        prop_assume!(!bad.starts_with("cantabular"));
        let mut engine = loaded_dataset();
        let before = engine.metadata().clone();
        prop_assert!(engine.set("type", bad.as_str()).is_err());
        prop_assert!(engine.set("last_updated", bad.as_str()).is_err());
        prop_assert_eq!(engine.metadata(), &before);
    }
}
