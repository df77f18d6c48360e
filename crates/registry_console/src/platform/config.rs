use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use registry_core::DEFAULT_REFRESH_SECONDS;
use registry_engine::{ClientSettings, ConsoleEndpoints, EngineConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "./registry_console.ron";

/// Settings read from the console's RON file; absent fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server_url: String,
    pub refresh_seconds: u32,
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub log_to_file: bool,
    /// `sessionid` cookie of a logged-in staff account.
    pub session_id: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server_url: ConsoleEndpoints::default().server_url,
            refresh_seconds: DEFAULT_REFRESH_SECONDS,
            output_dir: PathBuf::from("output"),
            request_timeout_secs: 60,
            log_to_file: true,
            session_id: None,
        }
    }
}

impl ConsoleConfig {
    pub fn engine_config(&self) -> EngineConfig {
        let client = ClientSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            session_id: self.session_id.clone(),
            ..ClientSettings::default()
        };
        EngineConfig {
            endpoints: ConsoleEndpoints::new(self.server_url.clone()),
            client,
            output_dir: self.output_dir.clone(),
            download_timestamp: Arc::new(|| Utc::now().to_rfc3339()),
        }
    }
}

/// First CLI argument, or the default file next to the working directory.
pub fn config_path(mut args: impl Iterator<Item = String>) -> PathBuf {
    args.nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Missing file yields defaults; unreadable or malformed files are errors.
pub fn load(path: &Path) -> anyhow::Result<ConsoleConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(ConsoleConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {path:?}"));
        }
    };
    ron::from_str(&content).with_context(|| format!("failed to parse config {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("console.ron");
        fs::write(
            &path,
            r#"(server_url: "https://repo.example/", refresh_seconds: 10)"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.server_url, "https://repo.example/");
        assert_eq!(config.refresh_seconds, 10);
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.session_id.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("console.ron");
        fs::write(&path, "(server_url: ").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn config_path_prefers_first_argument() {
        let args = ["registry_console", "custom.ron"].map(String::from);
        assert_eq!(config_path(args.into_iter()), PathBuf::from("custom.ron"));
        let args = ["registry_console"].map(String::from);
        assert_eq!(
            config_path(args.into_iter()),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
    }
}
