use std::fs;
use std::path::PathBuf;

use seedfile_config::{ConfigError, LogFormatSetting, load_from_path, validate};

#[test]
fn load_from_path_reads_full_document() -> anyhow::Result<()> {
    let dir = tempfile::Builder::new()
        .prefix("seedfile-config-")
        .tempdir()?;
    let path = dir.path().join("seedfile.json");
    fs::write(
        &path,
        r#"{
            "roots": {
                "source": "/srv/fixtures",
                "destination": "/srv/uploads",
                "allow_parent_traversal": true
            },
            "copy": { "buffer_size": 8192 },
            "logging": { "level": "debug", "format": "pretty" }
        }"#,
    )?;

    let config = load_from_path(&path)?;
    validate(&config)?;

    assert_eq!(config.roots.source, Some(PathBuf::from("/srv/fixtures")));
    assert_eq!(config.roots.destination, Some(PathBuf::from("/srv/uploads")));
    assert!(config.roots.allow_parent_traversal);
    assert_eq!(config.copy.buffer_size, 8192);
    assert_eq!(config.logging.format, LogFormatSetting::Pretty);
    Ok(())
}

#[test]
fn load_from_path_reports_parse_origin() -> anyhow::Result<()> {
    let dir = tempfile::Builder::new()
        .prefix("seedfile-config-")
        .tempdir()?;
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"copy": {"buffer_size": "big"}}"#)?;

    match load_from_path(&path) {
        Err(ConfigError::Parse { origin, .. }) => {
            assert_eq!(origin, path.display().to_string());
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    Ok(())
}
