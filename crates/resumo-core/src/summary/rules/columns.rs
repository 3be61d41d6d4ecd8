//! Column extraction: one classified line to one [`Product`].
//!
//! Three strategies cover the three kinds of source text:
//! - [`ColumnStrategy::FixedOffsets`] for rigid, column-aligned dumps
//! - [`ColumnStrategy::AnchorSplit`] for free text with regular spacing
//! - [`ColumnStrategy::TailRegex`] for free text with irregular spacing

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::LineError;
use crate::models::product::{DEFAULT_UNIT_VOLUME, Product};

use super::LineParser;
use super::patterns::{REFERENCE_CODE, TAIL_COLUMNS};

/// Character ranges of the fixed-layout export.
pub const CODE_COLUMN: Range<usize> = 0..15;
pub const DESCRIPTION_COLUMN: Range<usize> = 15..58;
pub const REFERENCE_COLUMN: Range<usize> = 58..72;
pub const CASE_UNIT_COLUMN: Range<usize> = 72..90;
pub const TOTAL_VALUE_COLUMN: Range<usize> = 90..112;
pub const AVERAGE_PRICE_COLUMN: Range<usize> = 112..132;
pub const UNIT_VOLUME_COLUMN: Range<usize> = 132..160;

/// Defaults used by lenient mode for the four trailing columns.
const LENIENT_DEFAULTS: [&str; 4] = ["0", "0,00", "0,00", DEFAULT_UNIT_VOLUME];

/// How a line is split into columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStrategy {
    /// Slice fixed character columns.
    FixedOffsets,
    /// Split on whitespace after the reference code.
    AnchorSplit,
    /// Match four trailing numeric groups, else split like `AnchorSplit`.
    #[default]
    TailRegex,
}

impl std::str::FromStr for ColumnStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fixed" | "fixed_offsets" => Ok(Self::FixedOffsets),
            "anchor" | "anchor_split" => Ok(Self::AnchorSplit),
            "tail" | "tail_regex" => Ok(Self::TailRegex),
            other => Err(format!("unknown column strategy: {other}")),
        }
    }
}

/// What to do with a record missing trailing columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Reject the line.
    #[default]
    Strict,
    /// Fill the missing columns with zeros.
    Lenient,
}

impl std::str::FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown parse mode: {other}")),
        }
    }
}

/// Line-to-record extractor with an explicit strategy and mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnExtractor {
    strategy: ColumnStrategy,
    mode: ParseMode,
}

impl ColumnExtractor {
    pub fn new(strategy: ColumnStrategy, mode: ParseMode) -> Self {
        Self { strategy, mode }
    }

    pub fn strategy(&self) -> ColumnStrategy {
        self.strategy
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }
}

impl LineParser for ColumnExtractor {
    fn parse_line(&self, line: &str) -> Result<Product, LineError> {
        parse_line(line, self.strategy, self.mode)
    }
}

/// Convert one line into a product record using `strategy`.
pub fn parse_line(line: &str, strategy: ColumnStrategy, mode: ParseMode) -> Result<Product, LineError> {
    match strategy {
        ColumnStrategy::FixedOffsets => parse_fixed_offsets(line),
        ColumnStrategy::AnchorSplit => parse_anchor_split(line, mode),
        ColumnStrategy::TailRegex => parse_tail_regex(line, mode),
    }
}

/// Slice the fixed character columns of a rigid export.
pub fn parse_fixed_offsets(line: &str) -> Result<Product, LineError> {
    let chars: Vec<char> = line.chars().collect();
    let column = |range: Range<usize>| -> String {
        let start = range.start.min(chars.len());
        let end = range.end.min(chars.len());
        chars[start..end].iter().collect::<String>().trim().to_string()
    };

    let description = column(DESCRIPTION_COLUMN);
    let reference = column(REFERENCE_COLUMN);
    if description.is_empty() && reference.is_empty() {
        return Err(LineError::Blank);
    }

    Ok(Product::new(
        description,
        reference,
        column(CASE_UNIT_COLUMN),
        column(TOTAL_VALUE_COLUMN),
        column(AVERAGE_PRICE_COLUMN),
        column(UNIT_VOLUME_COLUMN),
    )
    .with_code(column(CODE_COLUMN)))
}

/// Split a line around its first reference code.
///
/// Returns the description, the reference and the remaining text.
fn split_at_reference(line: &str) -> Result<(&str, &str, &str), LineError> {
    let m = REFERENCE_CODE.find(line).ok_or(LineError::NoReference)?;
    Ok((
        line[..m.start()].trim(),
        m.as_str().trim(),
        &line[m.end()..],
    ))
}

/// Map whitespace tokens after the reference to the four trailing columns.
fn columns_from_tokens(rest: &str, mode: ParseMode) -> Result<[String; 4], LineError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    if tokens.len() < 4 && mode == ParseMode::Strict {
        return Err(LineError::MissingColumns { found: tokens.len() });
    }

    Ok(std::array::from_fn(|i| {
        tokens
            .get(i)
            .map(|t| t.to_string())
            .unwrap_or_else(|| LENIENT_DEFAULTS[i].to_string())
    }))
}

/// Reference-anchored whitespace split.
pub fn parse_anchor_split(line: &str, mode: ParseMode) -> Result<Product, LineError> {
    let (description, reference, rest) = split_at_reference(line)?;
    let [case_unit, total_value, average_price, unit_volume] = columns_from_tokens(rest, mode)?;

    Ok(Product::new(
        description,
        reference,
        case_unit,
        total_value,
        average_price,
        unit_volume,
    ))
}

/// Trailing numeric-group match, falling back to the whitespace split.
pub fn parse_tail_regex(line: &str, mode: ParseMode) -> Result<Product, LineError> {
    let (description, reference, rest) = split_at_reference(line)?;

    if let Some(caps) = TAIL_COLUMNS.captures(rest) {
        return Ok(Product::new(
            description,
            reference,
            &caps[1],
            &caps[2],
            &caps[3],
            &caps[4],
        ));
    }

    trace!("Tail pattern missed, splitting on whitespace: {}", rest.trim());
    let [case_unit, total_value, average_price, unit_volume] = columns_from_tokens(rest, mode)?;

    Ok(Product::new(
        description,
        reference,
        case_unit,
        total_value,
        average_price,
        unit_volume,
    ))
}

/// Like [`parse_line`], but a line without reference code becomes the
/// [`Product::unidentified`] placeholder. For diagnostics only.
pub fn parse_line_or_sentinel(line: &str, strategy: ColumnStrategy, mode: ParseMode) -> Option<Product> {
    match parse_line(line, strategy, mode) {
        Ok(product) => Some(product),
        Err(LineError::NoReference) => Some(Product::unidentified()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FREE_LINE: &str = "CERV HEINEKEN PIL 0,60GFA RT 24UN CX - 24 3 694,00 231,33 0,432";
    const FIXED_LINE: &str = "    021/001    CERV HEINEKEN PIL 0,60GFA RT 24UN          CX - 24           3                      694,00           231,33            0,432";

    fn heineken() -> Product {
        Product::new(
            "CERV HEINEKEN PIL 0,60GFA RT 24UN",
            "CX - 24",
            "3",
            "694,00",
            "231,33",
            "0,432",
        )
    }

    #[test]
    fn test_anchor_split() {
        let product = parse_anchor_split(FREE_LINE, ParseMode::Strict).unwrap();
        assert_eq!(product, heineken());
    }

    #[test]
    fn test_anchor_split_strict_rejects_missing_columns() {
        let line = "CERV HEINEKEN PIL 0,60GFA RT 24UN CX - 24 3 694,00";
        assert_eq!(
            parse_anchor_split(line, ParseMode::Strict),
            Err(LineError::MissingColumns { found: 2 })
        );
    }

    #[test]
    fn test_anchor_split_lenient_fills_defaults() {
        let line = "CERV HEINEKEN PIL 0,60GFA RT 24UN CX - 24 3";
        let product = parse_anchor_split(line, ParseMode::Lenient).unwrap();
        assert_eq!(product.case_unit, "3");
        assert_eq!(product.total_value, "0,00");
        assert_eq!(product.average_price, "0,00");
        assert_eq!(product.unit_volume, "0,000");
    }

    #[test]
    fn test_tail_regex_tolerates_irregular_spacing() {
        let line = "CERV HEINEKEN PIL 0,60GFA RT 24UN   CX-24    3   R$ 1.167,38    231,33      0,432  ";
        let product = parse_tail_regex(line, ParseMode::Strict).unwrap();
        assert_eq!(product.reference, "CX-24");
        assert_eq!(product.case_unit, "3");
        assert_eq!(product.total_value, "1.167,38");
        assert_eq!(product.average_price, "231,33");
        assert_eq!(product.unit_volume, "0,432");
    }

    #[test]
    fn test_tail_regex_falls_back_to_split() {
        // "3cx" is not a quantity, so the tail pattern misses.
        let line = "CERV HEINEKEN PIL 0,60GFA RT 24UN CX - 24 3cx 694,00 231,33 0,432";
        let product = parse_tail_regex(line, ParseMode::Strict).unwrap();
        assert_eq!(product.case_unit, "3cx");
        assert_eq!(product.unit_volume, "0,432");
    }

    #[test]
    fn test_no_reference() {
        let line = "CERV HEINEKEN PIL 0,60GFA RT 24UN ?? 3 694,00 231,33 0,432";
        assert_eq!(
            parse_line(line, ColumnStrategy::TailRegex, ParseMode::Strict),
            Err(LineError::NoReference)
        );
        let sentinel =
            parse_line_or_sentinel(line, ColumnStrategy::AnchorSplit, ParseMode::Lenient).unwrap();
        assert!(sentinel.is_sentinel());
    }

    #[test]
    fn test_fixed_offsets() {
        let product = parse_fixed_offsets(FIXED_LINE).unwrap();
        assert_eq!(product, heineken().with_code("021/001"));
    }

    #[test]
    fn test_fixed_offsets_blank_volume_defaults() {
        let truncated: String = FIXED_LINE.chars().take(132).collect();
        let product = parse_fixed_offsets(&truncated).unwrap();
        assert_eq!(product.unit_volume, "0,000");
        assert_eq!(product.average_price, "231,33");

        let padded = format!("{truncated}          ");
        assert_eq!(parse_fixed_offsets(&padded).unwrap().unit_volume, "0,000");
    }

    #[test]
    fn test_fixed_offsets_multibyte_safe() {
        let line = "    021/001    CERV AÇAÍ ÁGUA                             CX - 12           1                       10,00            10,00            0,060";
        let product = parse_fixed_offsets(line).unwrap();
        assert_eq!(product.description, "CERV AÇAÍ ÁGUA");
        assert_eq!(product.reference, "CX - 12");
    }

    #[test]
    fn test_fixed_offsets_blank_line() {
        assert_eq!(parse_fixed_offsets("    021/001"), Err(LineError::Blank));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("fixed".parse::<ColumnStrategy>(), Ok(ColumnStrategy::FixedOffsets));
        assert_eq!("anchor-split".parse::<ColumnStrategy>(), Ok(ColumnStrategy::AnchorSplit));
        assert_eq!("tail_regex".parse::<ColumnStrategy>(), Ok(ColumnStrategy::TailRegex));
        assert!("magic".parse::<ColumnStrategy>().is_err());
        assert_eq!("Lenient".parse::<ParseMode>(), Ok(ParseMode::Lenient));
        assert!("loose".parse::<ParseMode>().is_err());
    }

    #[test]
    fn test_extractor_trait() {
        let extractor = ColumnExtractor::new(ColumnStrategy::AnchorSplit, ParseMode::Strict);
        assert_eq!(extractor.parse_line(FREE_LINE).unwrap(), heineken());
    }
}
