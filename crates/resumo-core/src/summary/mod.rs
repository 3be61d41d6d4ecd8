//! "RESUMO FINAL" extraction: rules, deterministic parser and AI orchestrator.

pub mod rules;
mod orchestrator;
mod parser;

pub use orchestrator::Extractor;
pub use parser::SummaryParser;
pub use rules::{ColumnExtractor, ColumnStrategy, LineClassifier, LineParser, ParseMode};
