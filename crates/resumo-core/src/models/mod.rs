//! Data models for reports, products and configuration.

pub mod config;
pub mod product;
pub mod report;

pub use config::ResumoConfig;
pub use product::{ExtractionMethod, ExtractionResult, OrderOrigins, Product};
pub use report::{Report, ReportSource, ReportState};
