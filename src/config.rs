use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;

pub const DEFAULT_DB_PATH: &str = ".snip/snip.sqlite";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub storage: StorageSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub db_path: Option<String>,
    pub busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    pub filter: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Effective settings after flags, environment and the config file are
/// merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: String,
    pub busy_timeout_ms: u64,
    pub log_filter: Option<String>,
}

impl Settings {
    pub fn resolve(cli_db: Option<&str>, file: &FileConfig) -> Self {
        let db_path = cli_db
            .and_then(non_empty)
            .or_else(|| file.storage.db_path.as_deref().and_then(non_empty))
            .unwrap_or(DEFAULT_DB_PATH)
            .to_string();
        Self {
            db_path,
            busy_timeout_ms: file
                .storage
                .busy_timeout_ms
                .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
            log_filter: file
                .log
                .filter
                .as_deref()
                .and_then(non_empty)
                .map(str::to_string),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/snip/config.toml"))
}

/// Loads the config file. An explicit path must exist; the default path is
/// optional.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(FileConfig::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(raw) => parse(&raw, &path),
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
            Ok(FileConfig::default())
        }
        Err(source) => Err(ConfigError::Read { path, source }),
    }
}

pub fn parse(raw: &str, path: &Path) -> Result<FileConfig, ConfigError> {
    toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{load, parse, ConfigError, FileConfig, Settings, DEFAULT_DB_PATH};

    #[test]
    fn parses_storage_and_log_sections() {
        let raw = r#"
[storage]
db_path = "/var/lib/snip/db.sqlite"
busy_timeout_ms = 250

[log]
filter = "snip=debug"
"#;
        let config = parse(raw, Path::new("config.toml")).expect("config should parse");
        assert_eq!(
            config.storage.db_path.as_deref(),
            Some("/var/lib/snip/db.sqlite")
        );
        assert_eq!(config.storage.busy_timeout_ms, Some(250));
        assert_eq!(config.log.filter.as_deref(), Some("snip=debug"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("[storage]\npath = \"x\"\n", Path::new("bad.toml"))
            .expect_err("unknown key should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn flag_beats_file_beats_default() {
        let mut file = FileConfig::default();
        assert_eq!(Settings::resolve(None, &file).db_path, DEFAULT_DB_PATH);
        assert_eq!(Settings::resolve(None, &file).busy_timeout_ms, 5000);

        file.storage.db_path = Some("from-file.sqlite".to_string());
        assert_eq!(Settings::resolve(None, &file).db_path, "from-file.sqlite");
        assert_eq!(
            Settings::resolve(Some("from-flag.sqlite"), &file).db_path,
            "from-flag.sqlite"
        );
        assert_eq!(
            Settings::resolve(Some("  "), &file).db_path,
            "from-file.sqlite"
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "snip-missing-config-{}.toml",
            uuid::Uuid::now_v7()
        ));
        let err = load(Some(&path)).expect_err("explicit missing path should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("snip-config-{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[log]\nfilter = \"info\"\n").expect("config should be writable");
        let config = load(Some(&path)).expect("config should load");
        assert_eq!(config.log.filter.as_deref(), Some("info"));
        let _ = std::fs::remove_file(path);
    }
}
