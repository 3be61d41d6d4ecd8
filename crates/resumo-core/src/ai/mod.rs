//! AI extraction backends.
//!
//! The orchestrator only sees [`ExtractionBackend`]; transport, encoding and
//! authentication live in the implementations.

mod prompt;

#[cfg(feature = "remote")]
mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

pub use prompt::{DELIMITED_PROMPT, JSON_PROMPT};

#[cfg(feature = "remote")]
pub use gemini::GeminiBackend;

/// A service that reads a PDF and answers a prompt with text.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Send `document` together with `prompt` and return the response text.
    async fn invoke(&self, document: &[u8], prompt: &str) -> Result<String, TransportError>;

    /// Backend name for logging.
    fn name(&self) -> &str {
        "backend"
    }
}

/// Response shape requested from the AI service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Strict JSON object with a products array and origin counts.
    #[default]
    Json,
    /// Table lines between `[TABLE_START]` and `[TABLE_END]`, then count lines.
    Delimited,
}

impl ResponseFormat {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Json => JSON_PROMPT,
            Self::Delimited => DELIMITED_PROMPT,
        }
    }
}

impl std::str::FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "delimited" | "text" => Ok(Self::Delimited),
            other => Err(format!("unknown response format: {other}")),
        }
    }
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Delimited => write!(f, "delimited"),
        }
    }
}
