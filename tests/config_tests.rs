use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;
use texted::error::{ConfigError, ErrorKind};
use texted::logging::Logger;
use texted::{BufferType, DocumentFactory, DocumentManager, EditorConfig, EditorError};

fn write_config(json: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_load_config_drives_manager() -> Result<()> {
    let file = write_config(
        r#"{
            "buffer": {
                "default_type": "rope",
                "large_document_type": "piece-table",
                "large_document_threshold": 64
            },
            "logging": { "level": "debug", "stderr": false }
        }"#,
    )?;

    let config = EditorConfig::load(file.path())?;
    assert_eq!(config.logging.level_filter()?, log::LevelFilter::Debug);
    assert!(!config.logging.stderr);

    let manager = DocumentManager::with_factory(DocumentFactory::with_policy(config.buffer));
    let short = manager.create_document(None, Some("short"), None)?;
    let long = manager.create_document(None, Some("y".repeat(64).as_str()), None)?;
    assert_eq!(short.buffer_type(), BufferType::Rope);
    assert_eq!(long.buffer_type(), BufferType::PieceTable);

    // 明示指定はポリシーより優先
    let explicit = manager.create_document(None, Some("y".repeat(64).as_str()), Some(BufferType::Simple))?;
    assert_eq!(explicit.buffer_type(), BufferType::Simple);
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = EditorConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));

    let editor_error: EditorError = err.into();
    assert_eq!(editor_error.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_malformed_and_invalid_files() -> Result<()> {
    let malformed = write_config("{ \"buffer\": ")?;
    assert!(matches!(
        EditorConfig::load(malformed.path()),
        Err(ConfigError::Parse { .. })
    ));

    let zero_threshold = write_config(r#"{ "buffer": { "large_document_threshold": 0 } }"#)?;
    assert!(matches!(
        EditorConfig::load(zero_threshold.path()),
        Err(ConfigError::InvalidValue { .. })
    ));

    let unknown_type = write_config(r#"{ "buffer": { "default_type": "gap" } }"#)?;
    assert!(matches!(
        EditorConfig::load(unknown_type.path()),
        Err(ConfigError::Parse { .. })
    ));
    Ok(())
}

#[test]
fn test_logger_from_loaded_config() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("editor.log");
    let json = format!(
        r#"{{ "logging": {{ "level": "warn", "stderr": false, "file": {} }} }}"#,
        serde_json::to_string(&log_path)?
    );
    let file = write_config(&json)?;

    let config = EditorConfig::load(file.path())?;
    let logger = Logger::from_config(&config.logging)?;
    assert_eq!(logger.level(), log::LevelFilter::Warn);
    Ok(())
}

#[test]
fn test_logging_init_installs_once() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("init.log");
    let mut config = EditorConfig::default();
    config.logging.stderr = false;
    config.logging.file = Some(log_path.clone());

    assert!(texted::logging::init(&config.logging)?);
    assert!(!texted::logging::init(&config.logging)?);

    let manager = DocumentManager::new();
    manager.create_document(Some("logged"), None, None)?;
    let written = std::fs::read_to_string(&log_path)?;
    assert!(written.contains("created document logged"));
    Ok(())
}
