//! Configuration types for the chat client.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the chat client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Advisory backend connection settings.
    pub backend: BackendConfig,
    /// Audio capture/playback settings.
    pub audio: AudioConfig,
}

/// Remote advisory backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base address of the advisory service.
    pub base_url: String,
    /// Static user identifier sent with every request.
    pub user_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            user_id: "local-user".to_owned(),
            timeout_secs: 60,
        }
    }
}

/// Audio I/O configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Recording sample rate in Hz (clips are encoded at this rate).
    pub input_sample_rate: u32,
    /// Input device name (None = system default).
    pub input_device: Option<String>,
    /// Output device name (None = system default).
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_sample_rate: 16_000,
            input_device: None,
            output_device: None,
        }
    }
}

impl ClientConfig {
    /// Default config file location under the platform config directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("krishi-chat")
            .join("config.toml")
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|e| {
            ClientError::Config(format!("invalid config {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ClientConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.user_id, "local-user");
        assert_eq!(config.backend.timeout_secs, 60);
        assert_eq!(config.audio.input_sample_rate, 16_000);
        assert!(config.audio.input_device.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
[backend]
base_url = "http://farm.example:9000"
"#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://farm.example:9000");
        assert_eq!(config.backend.user_id, "local-user");
        assert_eq!(config.audio.input_sample_rate, 16_000);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.backend.user_id, "local-user");
    }

    #[test]
    fn load_parses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[backend]
user_id = "farmer-42"

[audio]
input_sample_rate = 22050
"#,
        )
        .unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.backend.user_id, "farmer-42");
        assert_eq!(config.audio.input_sample_rate, 22_050);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend = 3").unwrap();
        assert!(ClientConfig::load(&path).is_err());
    }
}
