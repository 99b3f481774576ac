use serde::Deserialize;
use std::path::Path;

/// Environment variable carrying the remote identifier of the model blob.
pub const REMOTE_ID_ENV: &str = "Google_Drive_File_ID";

/// Environment variable pointing at the YAML config file.
pub const CONFIG_PATH_ENV: &str = "PHISHGUARD_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 10000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ModelConfig {
    /// Local path of the serialized model.
    pub path: String,
    /// Identifier substituted into `url_template`. Usually supplied through the environment.
    pub remote_id: Option<String>,
    /// Download URL with an `{id}` placeholder.
    pub url_template: String,
    /// Limit on connecting and on each read while downloading. The transfer as a whole is unbounded.
    pub download_timeout_secs: u64,
    pub download_retries: u32,
    pub retry_backoff_ms: u64,
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "optimized_phishing_model.onnx".to_string(),
            remote_id: None,
            url_template: "https://drive.google.com/uc?export=download&id={id}".to_string(),
            download_timeout_secs: 60,
            download_retries: 2,
            retry_backoff_ms: 500,
            intra_threads: 1,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl AppConfig {
    /// Parses a YAML document. Missing sections and fields take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reads the config file if it exists, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_yaml(&content)?
        } else {
            tracing::info!(path = %path.display(), "No config file found, using defaults");
            Self::default()
        };

        config.apply_remote_id(std::env::var(REMOTE_ID_ENV).ok());
        Ok(config)
    }

    /// Overrides the configured remote id. Blank values are ignored.
    pub fn apply_remote_id(&mut self, remote_id: Option<String>) {
        if let Some(id) = remote_id.filter(|id| !id.trim().is_empty()) {
            self.model.remote_id = Some(id);
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.bind_addr(), "0.0.0.0:10000");
        assert_eq!(config.model.path, "optimized_phishing_model.onnx");
        assert!(config.model.url_template.contains("{id}"));
        assert!(config.model.remote_id.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
server:
  port: 3000
model:
  path: models/phishing.onnx
  download_retries: 0
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.model.path, "models/phishing.onnx");
        assert_eq!(config.model.download_retries, 0);
        assert_eq!(config.model.download_timeout_secs, 60);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.server.port, 10000);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = AppConfig::from_yaml("server: [1, 2");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_remote_id_override() {
        let mut config = AppConfig::from_yaml("model:\n  remote_id: from-file\n").unwrap();
        config.apply_remote_id(Some("from-env".to_string()));
        assert_eq!(config.model.remote_id.as_deref(), Some("from-env"));

        config.apply_remote_id(Some("   ".to_string()));
        assert_eq!(config.model.remote_id.as_deref(), Some("from-env"));

        config.apply_remote_id(None);
        assert_eq!(config.model.remote_id.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.server.port, 10000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server:\n  host: 127.0.0.1\n  port: 8080\n").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
