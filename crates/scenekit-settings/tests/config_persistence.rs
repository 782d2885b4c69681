//! Config round-trips through the filesystem.

use scenekit_settings::{ensure_config_dir, EditorConfig, SettingsError};
use tempfile::TempDir;

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("editor.json");

    let mut config = EditorConfig::default();
    config.handles.handle_size = 10.0;
    config.clipboard.paste_step = 32.0;
    config.save_to_file(&path).expect("save json");

    let loaded = EditorConfig::load_from_file(&path).expect("load json");
    assert_eq!(loaded, config);
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("editor.toml");

    let mut config = EditorConfig::default();
    config.routing.min_handle_length = 55.0;
    config.text.font_family = "monospace".to_string();
    config.save_to_file(&path).expect("save toml");

    let loaded = EditorConfig::load_from_file(&path).expect("load toml");
    assert_eq!(loaded, config);
}

#[test]
fn test_save_rejects_invalid_config() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("editor.toml");

    let mut config = EditorConfig::default();
    config.gestures.marquee_threshold_px = -1.0;

    let err = config.save_to_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Config(_)));
    assert!(!path.exists());
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("editor.toml");
    std::fs::write(&path, "[routing]\nhandle_length_ratio = 2.0\n").expect("write");

    let err = EditorConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Config(_)));
}

#[test]
fn test_load_rejects_unknown_extension() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("editor.ini");
    std::fs::write(&path, "").expect("write");

    assert!(matches!(
        EditorConfig::load_from_file(&path),
        Err(SettingsError::Config(_))
    ));
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("editor.toml");

    let config = EditorConfig::load_or_default(&path).expect("defaults");
    assert_eq!(config, EditorConfig::default());

    ensure_config_dir(&path).expect("create dir");
    config.save_to_file(&path).expect("save");
    assert!(path.exists());
}

#[test]
fn test_load_missing_file_reports_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.toml");

    let err = EditorConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Read { path: ref p, .. } if p == &path));
    assert!(err.to_string().contains("absent.toml"));
}
