use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Logging configuration file not found: {}.", .0.display())]
    NotFound(PathBuf),
    #[error("Unable to read logging configuration {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid logging configuration {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid log filter `{0}`")]
    Filter(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// The `[logconfig]` table of a logging configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// Extra `EnvFilter` directives, comma separated.
    pub filter: Option<String>,
    /// Append log lines to this file instead of stderr.
    pub file: Option<PathBuf>,
    pub ansi: bool,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            filter: None,
            file: None,
            ansi: false,
            format: LogFormat::Full,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LogConfigFile {
    logconfig: LogConfig,
}

impl LogConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let shown = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            return Err(ConfigError::NotFound(shown));
        }
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(data: &str) -> Result<Self, toml::de::Error> {
        let file: LogConfigFile = toml::from_str(data)?;
        Ok(file.logconfig)
    }

    /// Directives handed to the tracing `EnvFilter`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.trim().to_string();
        if let Some(extra) = self.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            if !directives.is_empty() {
                directives.push(',');
            }
            directives.push_str(extra.trim());
        }
        directives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_logconfig_table() {
        let config = LogConfig::parse(
            r#"
            [logconfig]
            level = "debug"
            filter = "rustyline=warn"
            file = "/tmp/vault.log"
            format = "compact"
            "#,
        )
        .expect("parse");
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.directives(), "debug,rustyline=warn");
        assert!(!config.ansi);
    }

    #[test]
    fn missing_table_is_a_parse_error() {
        assert!(LogConfig::parse("level = \"debug\"").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = TempDir::new().expect("temp dir");
        let err = LogConfig::load(&temp.path().join("absent.toml")).expect_err("missing");
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().starts_with("Logging configuration file not found"));
    }
}
