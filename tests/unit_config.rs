use logbook::config::*;
use logbook::constants::{DEFAULT_FILE_TIME_FORMAT, DEFAULT_QUEUE_CAPACITY};
use logbook::LogError;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_log_config_default() {
    let config = LogConfig::default();

    assert_eq!(config.time_format, DEFAULT_FILE_TIME_FORMAT);
    assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    assert!(config.directory.as_os_str().is_empty());
    assert!(config.base_name.is_empty());
    assert!(config.version.is_none());
    // The test harness binary is the current process
    assert!(!config.arguments.is_empty());
    assert!(config.program_name.is_some());
}

#[test]
#[serial]
fn test_config_roundtrip_save_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("test_config.toml");

    let original_config = LogConfig::new("/var/log/demo", "service")
        .with_time_format("%Y%m%d")
        .with_program_name("service")
        .with_version("2.1.0")
        .with_arguments(["service", "--port", "8080"])
        .with_queue_capacity(32);

    original_config.save(&config_path).expect("Failed to save config");
    let loaded_config = LogConfig::from_file(&config_path).expect("Failed to load config");

    assert_eq!(original_config, loaded_config);
}

#[test]
#[serial]
fn test_config_save_creates_parent_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("dir").join("config.toml");

    LogConfig::new("logs", "app").save(&config_path).expect("Failed to save config");
    assert!(config_path.exists());
}

#[test]
#[serial]
fn test_config_partial_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("partial.toml");
    fs::write(&config_path, "directory = \"out\"\nbase_name = \"partial\"\n").unwrap();

    let config = LogConfig::from_file(&config_path).expect("Partial config should parse");
    assert_eq!(config.directory, PathBuf::from("out"));
    assert_eq!(config.base_name, "partial");
    assert_eq!(config.time_format, DEFAULT_FILE_TIME_FORMAT);
    assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_config_invalid_toml() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "directory = [unclosed").unwrap();

    let result = LogConfig::from_file(&config_path);
    assert!(matches!(result, Err(LogError::ConfigParse(_))));
}

#[test]
#[serial]
fn test_config_missing_file_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let result = LogConfig::from_file(temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(LogError::Io(_))));
}

#[test]
#[serial]
fn test_config_validation() {
    assert!(LogConfig::new("logs", "app").validate().is_ok());
    assert!(LogConfig::new("logs", "   ").validate().is_err());
    assert!(LogConfig::new("logs", "app")
        .with_queue_capacity(0)
        .validate()
        .is_err());
}

#[test]
#[serial]
fn test_config_path_platform_folder() {
    if let Ok(path) = LogConfig::config_path() {
        assert!(path.ends_with("config.toml"));
        let folder = path.parent().and_then(|p| p.file_name()).unwrap();
        if cfg!(any(target_os = "windows", target_os = "macos")) {
            assert_eq!(folder, "Logbook");
        } else {
            assert_eq!(folder, "logbook");
        }
    }
}
