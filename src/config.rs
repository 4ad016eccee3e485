use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;

use crate::error::ScanError;

/// Central configuration for portprobe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanning: ScanSettings,
    pub resolver: ResolverSettings,
    pub output: OutputSettings,
    /// Extra port → service labels, merged over the built-in table
    pub services: BTreeMap<u16, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub timeout_ms: u64,
    pub concurrency: usize,
    pub deadline_ms: Option<u64>,
    pub show_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub timeout_ms: u64,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub color_enabled: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            concurrency: 100,
            deadline_ms: None,
            show_progress: false,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            attempts: 1,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { color_enabled: true }
    }
}

impl Config {
    /// Load configuration from the standard config directory
    pub fn load() -> Result<Self> {
        Self::load_or_default(&Self::get_config_path())
    }

    /// Read `path` if it exists, otherwise use defaults. Nothing is written.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("portprobe");
        path.push("config.json");
        path
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.scanning.timeout_ms == 0 {
            return Err(ScanError::Config("scanning.timeout_ms must be greater than 0".into()));
        }

        if self.scanning.concurrency == 0 {
            return Err(ScanError::Config("scanning.concurrency must be greater than 0".into()));
        }

        if self.scanning.deadline_ms == Some(0) {
            return Err(ScanError::Config("scanning.deadline_ms must be greater than 0".into()));
        }

        if self.resolver.timeout_ms == 0 {
            return Err(ScanError::Config("resolver.timeout_ms must be greater than 0".into()));
        }

        Ok(())
    }
}
