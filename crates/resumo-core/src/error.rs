//! Error types for the resumo-core library.

use thiserror::Error;

/// Main error type for the resumo library.
#[derive(Error, Debug)]
pub enum ResumoError {
    /// Summary extraction error (the AI call itself failed).
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Remote drive error.
    #[error("drive error: {0}")]
    Drive(#[from] DriveError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Session state error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failures of a remote call at the network or auth layer.
///
/// These are the only failures that reach the user; every parsing-layer
/// problem degrades to a fallback strategy instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never completed (DNS, TLS, timeout, connection reset).
    #[error("network error: {0}")]
    Network(String),

    /// The credentials were rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The service refused the request because a quota was exhausted.
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

impl TransportError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Auth(message),
            429 => Self::Quota(message),
            _ => Self::Status { status, message },
        }
    }
}

/// Errors returned by the extraction orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The external AI extraction call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Why a single candidate line did not produce a record.
///
/// Per-line and non-fatal: the line is dropped from the output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line carries no usable columns.
    #[error("blank line")]
    Blank,

    /// The line is shorter than the classifier threshold.
    #[error("line too short ({len} < {min} chars)")]
    TooShort { len: usize, min: usize },

    /// The line is a table header or footer rule.
    #[error("header line")]
    Header,

    /// No reference code (e.g. "CX - 24") anchors the columns.
    #[error("no reference code found")]
    NoReference,

    /// Fewer numeric columns than required after the reference code.
    #[error("expected 4 columns after reference, found {found}")]
    MissingColumns { found: usize },

    /// The line was classified as noise.
    #[error("not a table line")]
    NotTableLine,
}

/// Errors related to the remote file source.
#[derive(Error, Debug)]
pub enum DriveError {
    /// No access token is available; the user must authorize first.
    #[error("authorization required")]
    AuthRequired,

    /// The token was rejected even after one refresh.
    #[error("authorization expired")]
    AuthExpired,

    /// The requested file or folder does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network or HTTP failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The listing response could not be decoded.
    #[error("invalid listing response: {0}")]
    InvalidResponse(String),
}

/// Errors related to the in-memory report session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The extraction finished for a report that is no longer selected.
    #[error("selection of report {id} is stale")]
    StaleSelection { id: String },

    /// No report with this id exists in the session.
    #[error("report not found: {0}")]
    NotFound(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Result type for the resumo library.
pub type Result<T> = std::result::Result<T, ResumoError>;
