//! Common regex patterns for sales-report summary extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Packaging reference code: unit token, optional hyphen, count ("CX - 24", "EB-12").
    // The trailing boundary keeps "SHR 12UNPBR" inside a description from anchoring.
    pub static ref REFERENCE_CODE: Regex = Regex::new(
        r"(?i)\b(?:CX|EB|UN|LN|SHR|BAR|LATAS|LAT)\s*-?\s*\d+\b"
    ).unwrap();

    // Product family prefix at the start of a description
    pub static ref FAMILY_PREFIX: Regex = Regex::new(
        r"(?i)^(?:CERV|REFR|AGUA|BBMI|CHOP|DRAFT)"
    ).unwrap();

    // Header and footer rule tokens
    pub static ref HEADER_TOKENS: Regex = Regex::new(
        r"(?i)DESCRI[ÇC][ÃA]O|VALOR\s+TOTAL|UN\s+VOLUME|PRODUTO"
    ).unwrap();

    // Fixed-layout header row
    pub static ref FIXED_LAYOUT_HEADER: Regex = Regex::new(
        r"PRODUTO.*UN VOLUME"
    ).unwrap();

    // Leading product code in fixed-layout rows ("021/001")
    pub static ref PRODUCT_CODE: Regex = Regex::new(
        r"^\s*\d{3}/\d{3}"
    ).unwrap();

    // Horizontal rule between header and rows
    pub static ref SEPARATOR_RULE: Regex = Regex::new(
        r"^\s*[-=_]{3,}\s*$"
    ).unwrap();

    // Four trailing columns: quantity, [R$] total, average price, volume
    pub static ref TAIL_COLUMNS: Regex = Regex::new(
        r"^\s*(\d[\d.]*)\s+(?:R\$\s*)?([\d.]*\d,\d{2})\s+(?:R\$\s*)?([\d.]*\d,\d{2})\s+(\d+(?:,\d+)?)\s*$"
    ).unwrap();

    // Count lines of the delimited response format
    pub static ref SFA_COUNT: Regex = Regex::new(
        r"(?im)^\s*SFA_COUNT\s*:\s*(\d+)\s*$"
    ).unwrap();

    pub static ref HEISHOP_COUNT: Regex = Regex::new(
        r"(?im)^\s*HEISHOP_COUNT\s*:\s*(\d+)\s*$"
    ).unwrap();
}

/// Opening marker of the delimited response format.
pub const TABLE_START: &str = "[TABLE_START]";

/// Closing marker of the delimited response format.
pub const TABLE_END: &str = "[TABLE_END]";

/// Order-origin marker for the SFA portal channel.
pub const SFA_MARKER: &str = "Origem: R = SFA via portal";

/// Order-origin marker for the Heishop B2B channel.
pub const HEISHOP_MARKER: &str = "Origem: G = Pedido Heishop (B2B)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_code_variants() {
        for code in ["CX - 24", "EB-12", "cx 6", "LATAS - 12", "UN-1", "SHR - 12"] {
            assert!(REFERENCE_CODE.is_match(code), "{code} should match");
        }
        assert!(!REFERENCE_CODE.is_match("CERV AMSTEL LAGER 0,269LT SHR 12UNPBR"));
        assert!(!REFERENCE_CODE.is_match("RT 24UN PBR"));
    }

    #[test]
    fn test_tail_columns() {
        let caps = TAIL_COLUMNS.captures(" 3  R$ 1.167,38   231,33 0,432 ").unwrap();
        assert_eq!(&caps[1], "3");
        assert_eq!(&caps[2], "1.167,38");
        assert_eq!(&caps[3], "231,33");
        assert_eq!(&caps[4], "0,432");
    }
}
