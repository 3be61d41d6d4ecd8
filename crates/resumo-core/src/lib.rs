//! Core library for sales-report summary extraction.
//!
//! This crate provides:
//! - Line classification and column extraction for the "RESUMO FINAL" block
//! - Order-origin counting (SFA via portal / Heishop B2B)
//! - AI extraction with a delimited/raw-text fallback chain
//! - Totals and brand/category rollups over a brand catalog
//! - A report session with stale-selection protection
//! - Remote folder listing and download

pub mod aggregate;
pub mod ai;
pub mod catalog;
pub mod drive;
pub mod error;
pub mod models;
pub mod pdf;
pub mod session;
pub mod summary;

pub use aggregate::{Inclusion, ReportMetrics, Rollup, aggregate};
pub use ai::{ExtractionBackend, ResponseFormat};
pub use catalog::{BrandCatalog, CatalogEntry};
pub use drive::{EnvTokenProvider, RemoteFileSource, TokenProvider};
pub use error::{
    DriveError, ExtractionError, LineError, PdfError, Result, ResumoError, SessionError,
    TransportError,
};
pub use models::{
    ExtractionMethod, ExtractionResult, OrderOrigins, Product, Report, ReportSource, ReportState,
    ResumoConfig,
};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use session::{Selection, Session};
pub use summary::{ColumnStrategy, Extractor, LineClassifier, LineParser, ParseMode, SummaryParser};

#[cfg(feature = "remote")]
pub use ai::GeminiBackend;
#[cfg(feature = "remote")]
pub use drive::GoogleDriveClient;
