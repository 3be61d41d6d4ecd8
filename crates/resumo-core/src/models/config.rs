//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::ResponseFormat;
use crate::error::ResumoError;
use crate::summary::rules::{ColumnStrategy, ParseMode};

/// Main configuration for resumo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumoConfig {
    /// AI extraction service configuration.
    pub ai: AiConfig,

    /// Remote drive configuration.
    pub drive: DriveConfig,

    /// Line classification and column extraction configuration.
    pub extraction: ExtractionConfig,

    /// Brand catalog configuration.
    pub catalog: CatalogConfig,
}

/// AI extraction service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL of the generative language API.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Response format requested in the prompt.
    pub response_format: ResponseFormat,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            response_format: ResponseFormat::Json,
            timeout_secs: 120,
        }
    }
}

impl AiConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ResumoError> {
        std::env::var(&self.api_key_env).map_err(|_| {
            ResumoError::Config(format!(
                "API key not configured; set the {} environment variable",
                self.api_key_env
            ))
        })
    }
}

/// Remote drive configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Base URL of the drive API.
    pub base_url: String,

    /// Folder holding the sales reports.
    pub folder_id: Option<String>,

    /// Environment variable holding the OAuth access token.
    pub token_env: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/drive/v3".to_string(),
            folder_id: None,
            token_env: "GOOGLE_DRIVE_TOKEN".to_string(),
        }
    }
}

/// Line classification and column extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum trimmed length for a table line in PDF text.
    pub min_line_length: usize,

    /// Lighter threshold for lines of an AI response.
    pub fallback_min_line_length: usize,

    /// Column strategy for free-form text.
    pub strategy: ColumnStrategy,

    /// Whether incomplete records are rejected or zero-filled.
    pub mode: ParseMode,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_line_length: 40,
            fallback_min_line_length: 30,
            strategy: ColumnStrategy::TailRegex,
            mode: ParseMode::Strict,
        }
    }
}

/// Brand catalog configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file replacing the built-in brand table.
    pub path: Option<PathBuf>,
}

impl ResumoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ResumoConfig =
            serde_json::from_str(r#"{"extraction": {"mode": "lenient"}}"#).unwrap();
        assert_eq!(config.extraction.mode, ParseMode::Lenient);
        assert_eq!(config.extraction.min_line_length, 40);
        assert_eq!(config.ai.model, "gemini-1.5-flash");
        assert!(config.drive.folder_id.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ResumoConfig::default();
        config.drive.folder_id = Some("folder-123".to_string());
        config.ai.response_format = ResponseFormat::Delimited;
        config.save(&path).unwrap();

        let loaded = ResumoConfig::from_file(&path).unwrap();
        assert_eq!(loaded.drive.folder_id.as_deref(), Some("folder-123"));
        assert_eq!(loaded.ai.response_format, ResponseFormat::Delimited);
    }

    #[test]
    fn test_missing_api_key() {
        let config = AiConfig {
            api_key_env: "RESUMO_TEST_KEY_THAT_IS_NOT_SET".to_string(),
            ..AiConfig::default()
        };
        assert!(matches!(config.api_key(), Err(ResumoError::Config(_))));
    }
}
