use easyrepo_core::{ConfigError, CoreConfig};
use std::io::Write;

#[test]
fn loads_config_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "database": {{ "busy_timeout_ms": 1500 }}, "logging": {{ "level": "error" }} }}"#
    )
    .unwrap();

    let config = CoreConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.database.busy_timeout_ms, 1500);
    assert_eq!(config.logging.level, "error");
    assert!(config.logging.dir.is_none());
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = CoreConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(&err, ConfigError::Io { path: reported, .. } if *reported == path));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let err = CoreConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
