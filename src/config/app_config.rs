use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Serialize, Deserialize};

use crate::constants::DEFAULT_CONFIG_FILE;
use crate::error::CollectError;

/// Object-storage credentials and target bucket (`OBS` section)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ObsConfig {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub akid: String,
    #[serde(default)]
    pub aks: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: Option<String>,
    /// Canned ACL for uploaded objects (defaults to public-read)
    #[serde(default)]
    pub acl: Option<String>,
}

impl ObsConfig {
    /// Check that every required key carries a value
    pub fn validate(&self) -> Result<(), CollectError> {
        let required = [
            ("provider", &self.provider),
            ("akid", &self.akid),
            ("aks", &self.aks),
            ("bucket", &self.bucket),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CollectError::Config(format!(
                    "'OBS.{}' is missing or empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Local repository used by the `collect` command (`REPOSITORY` section)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub path: String,
}

/// Whole configuration file
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(rename = "OBS", alias = "obs", default)]
    pub obs: Option<ObsConfig>,
    #[serde(rename = "REPOSITORY", alias = "repository", default)]
    pub repository: Option<RepositoryConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        let config: AppConfig = serde_yaml::from_str(content).context("Failed to parse YAML config")?;
        Ok(config)
    }

    /// Validated `OBS` section
    pub fn obs(&self) -> Result<&ObsConfig, CollectError> {
        let obs = self
            .obs
            .as_ref()
            .ok_or_else(|| CollectError::Config("'OBS' not found in config file".to_string()))?;
        obs.validate()?;
        Ok(obs)
    }

    /// Validated repository root, with `~` expanded
    pub fn repository_path(&self) -> Result<PathBuf, CollectError> {
        let repository = self.repository.as_ref().ok_or_else(|| {
            CollectError::Config("'REPOSITORY' not found in config file".to_string())
        })?;

        if repository.path.trim().is_empty() {
            return Err(CollectError::Config(
                "'REPOSITORY.path' is missing or empty".to_string(),
            ));
        }
        Ok(expand_tilde(Path::new(repository.path.trim())))
    }
}

/// Default config location: `~/.cresrc.yml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE))
}

/// Replace a leading `~` with the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Load the configuration from `path`, or from the default location
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path {
        Some(p) => expand_tilde(p),
        None => default_config_path()
            .ok_or_else(|| anyhow!("Cannot locate home directory for default config file"))?,
    };
    AppConfig::from_yaml_file(&path)
}
