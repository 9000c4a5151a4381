use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding the four category directories
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    /// Upload size ceiling in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Maximum length of the optional description field
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upload_path() -> String {
    "uploads".to_string()
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_max_description_length() -> usize {
    200
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_path: default_upload_path(),
            max_file_size: default_max_file_size(),
            max_description_length: default_max_description_length(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from conf.ini or config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["conf.ini", "config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: FB_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("FB_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("FB_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        // Storage overrides
        if let Ok(val) = env::var("FB_CONF_STORAGE_UPLOAD_PATH") {
            self.storage.upload_path = val;
        }
        if let Ok(val) = env::var("FB_CONF_STORAGE_MAX_FILE_SIZE") {
            if let Ok(size) = val.parse() {
                self.storage.max_file_size = size;
            }
        }
        if let Ok(val) = env::var("FB_CONF_STORAGE_MAX_DESCRIPTION_LENGTH") {
            if let Ok(len) = val.parse() {
                self.storage.max_description_length = len;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.upload_path, "uploads");
        assert_eq!(config.storage.max_file_size, 5_242_880);
        assert_eq!(config.storage.max_description_length, 200);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[storage]\nupload_path = \"data/files\"\n").unwrap();
        assert_eq!(config.storage.upload_path, "data/files");
        assert_eq!(config.storage.max_file_size, 5_242_880);
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
