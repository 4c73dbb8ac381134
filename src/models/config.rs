use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "xmlcheck.toml";

/// Element local names the validator looks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagNames {
    pub question: String,
    pub option: String,
    pub explanation: String,
    pub answer: String,
}

impl Default for TagNames {
    fn default() -> Self {
        Self {
            question: "Question".to_string(),
            option: "Option-2".to_string(),
            explanation: "Explanations".to_string(),
            answer: "Answer".to_string(),
        }
    }
}

/// Web form settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Default ceiling for element and answer numbers
pub const DEFAULT_MAX_NUMBER: u64 = 100_000;

/// Limits applied while checking numbering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Largest number a Question, Explanations or Answer entry may carry;
    /// documents citing a larger one are rejected
    pub max_number: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_number: DEFAULT_MAX_NUMBER,
        }
    }
}

/// Top-level configuration, read from `xmlcheck.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlcheckConfig {
    pub tags: TagNames,
    pub server: ServerConfig,
    pub validation: ValidationConfig,
}

impl XmlcheckConfig {
    /// Load config from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: XmlcheckConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Load config from `<dir>/xmlcheck.toml`, then the user config
    /// directory, falling back to defaults when neither exists
    pub fn discover(dir: &Path) -> anyhow::Result<Self> {
        match Self::search_paths(dir).into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    fn search_paths(dir: &Path) -> Vec<PathBuf> {
        let mut paths = vec![dir.join(CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("xmlcheck").join("config.toml"));
        }
        paths
    }

    /// Resolve `--config` if given, otherwise search from `dir`
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::discover(dir),
        }
    }
}
