//! Integration tests for config-expect
//!
//! Tests full workflows: registration, file loading, coercion, write-back.

use config_expect::{
    DataType, ErrorCategory, ExpectationError, ExpectationRegistry, TomlFormat, Value,
};
use std::fs;
use tempfile::TempDir;

fn app_registry() -> ExpectationRegistry {
    let mut registry = ExpectationRegistry::new();
    registry
        .register("Net", "port", DataType::Integer, 8080, Some("listen port"))
        .unwrap();
    registry
        .register("Net", "host", DataType::String, "localhost", None)
        .unwrap();
    registry
        .register("Net", "tls", DataType::Boolean, false, None)
        .unwrap();
    registry
        .register("Limits", "ratio", DataType::Float, 0.25, None)
        .unwrap();
    registry
        .register("Limits", "port", DataType::Integer, 9000, None)
        .unwrap();
    registry
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_port_read_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.ini");
    fs::write(&path, "[Net]\nport = 9090\n").unwrap();

    let mut registry = ExpectationRegistry::new();
    registry
        .register("Net", "port", DataType::Integer, 8080, None)
        .unwrap();

    registry.load_from(&path).unwrap();
    assert_eq!(registry.get_value("Net", "port"), Some(&Value::Integer(9090)));
}

#[test]
fn test_unparseable_port_uses_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.ini");
    fs::write(&path, "[Net]\nport = notanumber\n").unwrap();

    let mut registry = ExpectationRegistry::new();
    registry
        .register("Net", "port", DataType::Integer, 8080, None)
        .unwrap();

    let report = registry.load_from(&path).unwrap();
    assert_eq!(registry.get_value("Net", "port"), Some(&Value::Integer(8080)));
    assert_eq!(report.fallbacks.len(), 1);
}

#[test]
fn test_missing_file_uses_defaults_and_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.ini");

    let mut registry = app_registry();
    let err = registry.load_from(&path).unwrap_err();

    assert!(matches!(err, ExpectationError::SourceMissing { .. }));
    assert_eq!(err.category(), ErrorCategory::Load);
    assert_eq!(registry.get_integer("Net", "port"), Some(8080));
    assert_eq!(registry.get_str("Net", "host"), Some("localhost"));
    assert!(registry.iter().all(|e| e.value() == Some(e.default())));
    assert!(registry.is_ready());
    assert_eq!(registry.source_path(), None);
}

#[test]
fn test_malformed_file_uses_defaults_and_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.ini");
    fs::write(&path, "[Net]\nport = 9090\nthis line has no delimiter\n").unwrap();

    let mut registry = app_registry();
    let err = registry.load_from(&path).unwrap_err();

    assert!(matches!(err, ExpectationError::SourceMalformed { .. }));
    assert!(err.to_string().contains("line 3"));
    assert_eq!(registry.get_integer("Net", "port"), Some(8080));
}

#[test]
fn test_file_without_sections_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.ini");
    fs::write(&path, "# nothing here\n").unwrap();

    let mut registry = app_registry();
    assert!(matches!(
        registry.load_from(&path),
        Err(ExpectationError::SourceEmpty { .. })
    ));
    assert_eq!(registry.get_float("Limits", "ratio"), Some(0.25));
}

#[test]
fn test_directory_as_source_is_unreadable() {
    let temp_dir = TempDir::new().unwrap();

    let mut registry = app_registry();
    let err = registry.load_from(temp_dir.path()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Load);
    assert!(registry.is_ready());
}

#[test]
fn test_full_file_with_mixed_outcomes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.ini");
    fs::write(
        &path,
        "\
# application settings
[Net]
Port = 9443
tls = Yes
host = example.org
unknown = ignored

[Limits]
ratio = not-a-float
port = 7000
",
    )
    .unwrap();

    let mut registry = app_registry();
    let report = registry.load_from(&path).unwrap();

    assert_eq!(registry.get_integer("Net", "port"), Some(9443));
    assert_eq!(registry.get_bool("Net", "tls"), Some(true));
    assert_eq!(registry.get_str("Net", "host"), Some("example.org"));
    assert_eq!(registry.get_float("Limits", "ratio"), Some(0.25));
    assert_eq!(registry.get_integer("Limits", "port"), Some(7000));

    assert_eq!(report.from_source.len(), 4);
    assert_eq!(report.fallbacks.len(), 1);
    assert!(report.defaulted.is_empty());
    assert_eq!(report.ignored, 1);
    assert_eq!(registry.source_path(), Some(path.as_path()));
}

// ============================================================================
// UPDATE & WRITE-BACK
// ============================================================================

#[test]
fn test_write_back_to_loaded_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.ini");
    fs::write(&path, "[Net]\nport = 9090\n").unwrap();

    let mut registry = app_registry();
    registry.load_from(&path).unwrap();
    registry.set_value("Net", "tls", true).unwrap();
    registry.write_to(None).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "[Net]\nport = 9090\nhost = localhost\ntls = true\n\n[Limits]\nratio = 0.25\nport = 9000\n"
    );
}

#[test]
fn test_write_then_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.ini");

    let mut source = app_registry();
    let _ = source.load_from(temp_dir.path().join("none.ini"));
    source.set_value("Net", "port", 1234).unwrap();
    source.set_value("Net", "host", "multi\nline host").unwrap();
    source.set_value("Net", "tls", true).unwrap();
    source.set_value("Limits", "ratio", 1e-9).unwrap();
    source.set_value("Limits", "port", -1).unwrap();
    source.write_to(Some(path.as_path())).unwrap();

    let mut fresh = ExpectationRegistry::new();
    fresh.register("Net", "port", DataType::Integer, 0, None).unwrap();
    fresh.register("Net", "host", DataType::String, "", None).unwrap();
    fresh.register("Net", "tls", DataType::Boolean, false, None).unwrap();
    fresh.register("Limits", "ratio", DataType::Float, 0.0, None).unwrap();
    fresh.register("Limits", "port", DataType::Integer, 0, None).unwrap();
    let report = fresh.load_from(&path).unwrap();

    assert!(report.fallbacks.is_empty());
    assert!(report.defaulted.is_empty());
    for expectation in &source {
        assert_eq!(
            fresh.get_value(expectation.section(), expectation.key()),
            expectation.value(),
            "{}.{}",
            expectation.section(),
            expectation.key()
        );
    }
}

#[test]
fn test_write_before_load_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("defaults.ini");

    let registry = app_registry();
    registry.write_to(Some(path.as_path())).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("port = 8080"));
    assert!(written.contains("ratio = 0.25"));
    assert!(written.contains("tls = false"));
}

#[test]
fn test_write_into_missing_directory_fails_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no").join("such").join("dir.ini");

    let registry = app_registry();
    let err = registry.write_to(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, ExpectationError::WriteFailed { .. }));
    assert_eq!(err.category(), ErrorCategory::Write);
    assert!(!path.exists());
}

#[test]
fn test_failed_write_leaves_existing_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("occupied");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), "keep").unwrap();

    let registry = app_registry();
    assert!(registry.write_to(Some(target.as_path())).is_err());
    assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "keep");

    let leftovers: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_overwrite_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.ini");
    fs::write(&path, "[Net]\nport = 1\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

    let mut registry = app_registry();
    registry.load_from(&path).unwrap();
    registry.write_to(None).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}

// ============================================================================
// TOML FORMAT
// ============================================================================

#[test]
fn test_toml_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.toml");
    fs::write(
        &path,
        "[Net]\nport = 9090\nhost = \"007\"\n\n[Limits]\nratio = 0.5\n",
    )
    .unwrap();

    let mut registry = ExpectationRegistry::with_format(TomlFormat);
    registry.register("Net", "port", DataType::Integer, 1, None).unwrap();
    registry.register("Net", "host", DataType::String, "", None).unwrap();
    registry.register("Limits", "ratio", DataType::Float, 0.0, None).unwrap();
    registry.load_from(&path).unwrap();

    assert_eq!(registry.get_integer("Net", "port"), Some(9090));
    assert_eq!(registry.get_str("Net", "host"), Some("007"));

    registry.write_to(None).unwrap();
    let mut reloaded = ExpectationRegistry::with_format(TomlFormat);
    reloaded.register("Net", "host", DataType::String, "", None).unwrap();
    reloaded.load_from(&path).unwrap();
    assert_eq!(reloaded.get_str("Net", "host"), Some("007"));
}
