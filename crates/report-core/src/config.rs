//! Configuration management for the report tasks

use serde::{Deserialize, Serialize};
use crate::constants::{
    DEFAULT_MARKET_LENS_URL, DEFAULT_MAX_RETRIES, DEFAULT_REPORT_LABEL, DEFAULT_STORAGE_DIR,
    DEFAULT_TOC_TITLE,
};
use crate::error::{ReportError, Result};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub market_lens: MarketLensConfig,
}

/// Where generated files land when the caller gives no explicit path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(alias = "dir", default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
        }
    }
}

/// Markdown document options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_report_label")]
    pub report_label: String,

    // Off by default; downstream PDF conversion builds its own
    #[serde(default)]
    pub include_toc: bool,

    #[serde(default = "default_toc_title")]
    pub toc_title: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            report_label: default_report_label(),
            include_toc: false,
            toc_title: default_toc_title(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketLensConfig {
    #[serde(alias = "token", default)]
    pub api_key: String,

    #[serde(alias = "url", default = "default_market_lens_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for MarketLensConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_market_lens_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl MarketLensConfig {
    /// Checks needed before any request is made
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ReportError::Config("Market Lens API key is required".to_string()));
        }

        if self.base_url.trim().is_empty() {
            return Err(ReportError::Config("Market Lens base URL is required".to_string()));
        }

        Ok(())
    }
}

// Default functions
fn default_storage_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_DIR)
}

fn default_report_label() -> String {
    DEFAULT_REPORT_LABEL.to_string()
}

fn default_toc_title() -> String {
    DEFAULT_TOC_TITLE.to_string()
}

fn default_market_lens_url() -> String {
    DEFAULT_MARKET_LENS_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

impl ReportConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReportError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)
            .map_err(|e| ReportError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.storage_dir.as_os_str().is_empty() {
            return Err(ReportError::Config("Storage directory is required".to_string()));
        }

        if self.document.report_label.trim().is_empty() {
            return Err(ReportError::Config("Report label is required".to_string()));
        }

        if self.market_lens.max_retries == 0 {
            return Err(ReportError::Config(
                "Market Lens max_retries is required to be at least 1".to_string()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_empty_json() {
        let parsed = ReportConfig::from_json_str("{}").unwrap();
        let default = ReportConfig::default();

        assert_eq!(parsed.storage.storage_dir, default.storage.storage_dir);
        assert_eq!(parsed.document.report_label, default.document.report_label);
        assert_eq!(parsed.document.include_toc, default.document.include_toc);
        assert_eq!(parsed.market_lens.base_url, default.market_lens.base_url);
        assert_eq!(parsed.market_lens.max_retries, 3);
    }

    #[test]
    fn test_market_lens_requires_api_key() {
        let config = MarketLensConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("API key is required"));

        let config = MarketLensConfig {
            api_key: "key".to_string(),
            ..MarketLensConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
