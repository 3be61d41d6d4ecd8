//! Rule-based extractors for the "RESUMO FINAL" block.

pub mod amounts;
pub mod classifier;
pub mod columns;
pub mod origins;
pub mod patterns;

pub use amounts::{format_monetary, format_volume, parse_count, parse_decimal, parse_monetary};
pub use classifier::{
    FALLBACK_MIN_LINE_LENGTH, LineClassifier, MIN_LINE_LENGTH, classify_line, fixed_layout_lines,
    is_table_line,
};
pub use columns::{ColumnExtractor, ColumnStrategy, ParseMode, parse_line, parse_line_or_sentinel};
pub use origins::{count_literal, count_origins, count_structured, resolve_origins};

use crate::error::LineError;
use crate::models::product::Product;

/// Trait for line-to-record extractors.
pub trait LineParser {
    /// Convert one classified line into a product record.
    fn parse_line(&self, line: &str) -> Result<Product, LineError>;

    /// Parse every line, dropping failures and keeping input order.
    fn parse_lines<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Vec<Product> {
        lines
            .into_iter()
            .filter_map(|line| match self.parse_line(line) {
                Ok(product) if !product.is_sentinel() => Some(product),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!("Dropped line ({}): {}", e, line.trim());
                    None
                }
            })
            .collect()
    }
}
