//! Brazilian-format number parsing and formatting.
//!
//! Monetary columns use a dot as thousands separator and a comma as decimal
//! separator ("1.167,38"). Volume columns use only the comma ("0,432").

use rust_decimal::Decimal;
use std::str::FromStr;

/// Keep digits, separators and sign, dropping currency symbols and spaces.
fn numeric_chars(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect()
}

/// Parse a monetary value such as "1.167,38" or "R$ 950,00".
pub fn parse_monetary(s: &str) -> Option<Decimal> {
    let normalized = numeric_chars(s).replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).ok()
}

/// Parse a decimal value such as "0,432".
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let normalized = numeric_chars(s).replace(',', ".");
    Decimal::from_str(&normalized).ok()
}

/// Parse a case/unit count, accepting a thousands dot ("1.200").
pub fn parse_count(s: &str) -> Option<i64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != '.').collect();
    cleaned.parse().ok()
}

/// Group the integer digits in threes with `separator`.
fn group_thousands(digits: &str, separator: char) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(separator);
        }
        formatted.push(*c);
    }

    formatted
}

/// Format a monetary value in pt-BR style ("1.167,38").
pub fn format_monetary(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };

    format!("{}{},{}", sign, group_thousands(integer_part, '.'), decimal_part)
}

/// Format a volume with three fractional digits ("1,031").
pub fn format_volume(volume: Decimal) -> String {
    format!("{:.3}", volume).replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_monetary() {
        assert_eq!(parse_monetary("1.167,38"), Some(dec("1167.38")));
        assert_eq!(parse_monetary("950,00"), Some(dec("950.00")));
        assert_eq!(parse_monetary("R$ 12.345.678,90"), Some(dec("12345678.90")));
        assert_eq!(parse_monetary(""), None);
        assert_eq!(parse_monetary("abc"), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("0,432"), Some(dec("0.432")));
        assert_eq!(parse_decimal("0,000"), Some(Decimal::ZERO));
        assert_eq!(parse_decimal(" 12,5 "), Some(dec("12.5")));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count("1.200"), Some(1200));
        assert_eq!(parse_count("3cx"), None);
    }

    #[test]
    fn test_format_monetary() {
        assert_eq!(format_monetary(dec("1167.38")), "1.167,38");
        assert_eq!(format_monetary(dec("12345678.9")), "12.345.678,90");
        assert_eq!(format_monetary(dec("40")), "40,00");
        assert_eq!(format_monetary(dec("-1300.27")), "-1.300,27");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(dec("1.031")), "1,031");
        assert_eq!(format_volume(Decimal::ZERO), "0,000");
    }
}
