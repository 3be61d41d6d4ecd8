//! Deterministic summary parser: classifier + column extractor + origin counter.
//!
//! Used directly for column-aligned dumps and as the fallback chain behind
//! the AI extraction when its response is not valid JSON.

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::product::{ExtractionMethod, ExtractionResult, Product};

use super::rules::{
    ColumnExtractor, ColumnStrategy, LineClassifier, LineParser, ParseMode,
    columns::parse_fixed_offsets,
    fixed_layout_lines,
    origins::{count_literal, count_structured, resolve_origins},
    patterns::{TABLE_END, TABLE_START},
};

/// Lines of a response split by the `[TABLE_START]`/`[TABLE_END]` markers.
#[derive(Debug, Default)]
struct DelimitedSections<'a> {
    inside: Vec<&'a str>,
    outside: Vec<&'a str>,
    has_markers: bool,
}

impl<'a> DelimitedSections<'a> {
    fn split(text: &'a str) -> Self {
        let mut sections = Self::default();
        let mut in_table = false;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case(TABLE_START) {
                in_table = true;
                sections.has_markers = true;
                continue;
            }
            if trimmed.eq_ignore_ascii_case(TABLE_END) {
                in_table = false;
                continue;
            }

            if in_table {
                sections.inside.push(line);
            } else {
                sections.outside.push(line);
            }
        }

        sections
    }
}

/// Summary parser over already-extracted text.
///
/// PDF text goes through the stricter length threshold; AI responses,
/// which are already trimmed to the table, use the lighter one.
#[derive(Debug, Clone, Copy)]
pub struct SummaryParser {
    text_classifier: LineClassifier,
    response_classifier: LineClassifier,
    extractor: ColumnExtractor,
}

impl SummaryParser {
    /// Parser with the default thresholds, tail regex and strict mode.
    pub fn new() -> Self {
        Self {
            text_classifier: LineClassifier::default(),
            response_classifier: LineClassifier::fallback(),
            extractor: ColumnExtractor::new(ColumnStrategy::TailRegex, ParseMode::Strict),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            text_classifier: LineClassifier::new(config.min_line_length),
            response_classifier: LineClassifier::new(config.fallback_min_line_length),
            extractor: ColumnExtractor::new(config.strategy, config.mode),
        }
    }

    /// Set the minimum line length for PDF text.
    pub fn with_min_line_length(mut self, min_len: usize) -> Self {
        self.text_classifier = LineClassifier::new(min_len);
        self
    }

    /// Set the minimum line length for AI responses.
    pub fn with_fallback_min_line_length(mut self, min_len: usize) -> Self {
        self.response_classifier = LineClassifier::new(min_len);
        self
    }

    /// Set the column strategy used for free-form lines.
    pub fn with_strategy(mut self, strategy: ColumnStrategy) -> Self {
        self.extractor = ColumnExtractor::new(strategy, self.extractor.mode());
        self
    }

    /// Set strict or lenient parsing.
    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.extractor = ColumnExtractor::new(self.extractor.strategy(), mode);
        self
    }

    /// Parse free-form text returned by the AI service.
    ///
    /// With `[TABLE_START]`/`[TABLE_END]` markers only the lines inside them
    /// are candidates and the count lines are read outside them. Without
    /// markers every line is a candidate.
    pub fn parse_response(&self, text: &str) -> ExtractionResult {
        self.parse_free_form(text, &self.response_classifier)
    }

    /// Parse free-form lines of PDF text with the stricter threshold.
    pub fn parse_free_text(&self, text: &str) -> ExtractionResult {
        self.parse_free_form(text, &self.text_classifier)
    }

    fn parse_free_form(&self, text: &str, classifier: &LineClassifier) -> ExtractionResult {
        let sections = DelimitedSections::split(text);

        let (candidates, method, structured) = if sections.has_markers {
            let outside = sections.outside.join("\n");
            (sections.inside, ExtractionMethod::Delimited, count_structured(&outside))
        } else {
            let all: Vec<&str> = text.lines().collect();
            (all, ExtractionMethod::RawText, count_structured(text))
        };

        let table_lines = classifier.filter(candidates.iter().copied());
        let products = self.extractor.parse_lines(table_lines.iter().copied());
        let origins = resolve_origins(structured, text);

        debug!(
            "{:?} parse: {} candidate lines, {} classified, {} products",
            method,
            candidates.len(),
            table_lines.len(),
            products.len()
        );

        ExtractionResult::new(products, origins, method)
    }

    /// Parse a rigid, column-aligned dump by fixed offsets.
    pub fn parse_fixed_layout(&self, text: &str) -> ExtractionResult {
        let products: Vec<Product> = fixed_layout_lines(text)
            .into_iter()
            .filter_map(|line| match parse_fixed_offsets(line) {
                Ok(product) => Some(product),
                Err(e) => {
                    debug!("Dropped fixed-layout row ({}): {}", e, line.trim());
                    None
                }
            })
            .collect();

        info!("Fixed-layout parse extracted {} products", products.len());
        ExtractionResult::new(products, count_literal(text), ExtractionMethod::FixedLayout)
    }

    /// Parse PDF text: fixed layout when the rigid header is found, free-form otherwise.
    pub fn parse_text(&self, text: &str) -> ExtractionResult {
        let fixed = self.parse_fixed_layout(text);
        if !fixed.is_empty() {
            return fixed;
        }
        self.parse_free_text(text)
    }
}

impl Default for SummaryParser {
    fn default() -> Self {
        Self::new()
    }
}
