//! Line classification for the "RESUMO FINAL" table block.

use tracing::trace;

use crate::error::LineError;

use super::patterns::{
    FAMILY_PREFIX, FIXED_LAYOUT_HEADER, HEADER_TOKENS, PRODUCT_CODE, REFERENCE_CODE,
    SEPARATOR_RULE,
};

/// Minimum trimmed length of a free-form table line (six columns).
pub const MIN_LINE_LENGTH: usize = 40;

/// Lighter threshold used by the raw-text fallback.
pub const FALLBACK_MIN_LINE_LENGTH: usize = 30;

/// Decide whether a free-form line belongs to the summary table.
///
/// Rules apply in order, first decision wins: too short, header token,
/// reference code, product family prefix.
pub fn classify_line(line: &str, min_len: usize) -> Result<(), LineError> {
    let trimmed = line.trim();
    let len = trimmed.chars().count();

    if len < min_len {
        return Err(LineError::TooShort { len, min: min_len });
    }

    if HEADER_TOKENS.is_match(trimmed) {
        return Err(LineError::Header);
    }

    if REFERENCE_CODE.is_match(trimmed) {
        return Ok(());
    }

    if FAMILY_PREFIX.is_match(trimmed) {
        return Ok(());
    }

    Err(LineError::NotTableLine)
}

/// Boolean form of [`classify_line`].
pub fn is_table_line(line: &str, min_len: usize) -> bool {
    classify_line(line, min_len).is_ok()
}

/// Collect the rows of a column-aligned dump.
///
/// Starts after the first line carrying both `PRODUTO` and `UN VOLUME` and
/// keeps every line led by a `000/000` product code. Blank lines are
/// skipped; once at least one row was taken, the first other line
/// (a footer rule or a totals line) closes the block.
pub fn fixed_layout_lines(text: &str) -> Vec<&str> {
    let mut lines = text.lines();

    if !lines.by_ref().any(|l| FIXED_LAYOUT_HEADER.is_match(l)) {
        trace!("No fixed-layout header found");
        return Vec::new();
    }

    let mut rows = Vec::new();
    for line in lines {
        if PRODUCT_CODE.is_match(line) {
            rows.push(line);
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        if !rows.is_empty() {
            break;
        }

        // Rules and wrapped header text between the header and the first row
        if !SEPARATOR_RULE.is_match(line) {
            trace!("Skipping pre-table line: {}", line.trim());
        }
    }

    rows
}

/// Classifier over free-form lines with a fixed threshold.
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier {
    min_len: usize,
}

impl LineClassifier {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    /// Threshold used by the raw-text fallback path.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_MIN_LINE_LENGTH)
    }

    pub fn classify(&self, line: &str) -> Result<(), LineError> {
        classify_line(line, self.min_len)
    }

    /// Keep candidate lines in input order.
    pub fn filter<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        lines
            .into_iter()
            .filter(|line| match self.classify(line) {
                Ok(()) => true,
                Err(reason) => {
                    trace!("Rejected line ({}): {}", reason, line.trim());
                    false
                }
            })
            .collect()
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(MIN_LINE_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DUMP: &str = include_str!("../../../testdata/resumo_final.txt");

    #[test]
    fn test_short_lines_always_rejected() {
        // Carries a reference code and a family prefix but is too short.
        let line = "CERV X CX - 24 3 1,00 1,00 0,010";
        assert!(line.len() < MIN_LINE_LENGTH);
        assert_eq!(
            classify_line(line, MIN_LINE_LENGTH),
            Err(LineError::TooShort {
                len: line.chars().count(),
                min: MIN_LINE_LENGTH
            })
        );
        assert!(is_table_line(line, 20));
    }

    #[test]
    fn test_header_rejected() {
        let header = "PRODUTO     DESCRICAO                     REFER.    CAIXA / UNID   VALOR TOTAL";
        assert_eq!(classify_line(header, MIN_LINE_LENGTH), Err(LineError::Header));

        let accented = "Descrição do produto        Referência       Valor Total     Un Volume";
        assert_eq!(classify_line(accented, MIN_LINE_LENGTH), Err(LineError::Header));
    }

    #[test]
    fn test_reference_code_accepts() {
        assert!(is_table_line(
            "CERV HEINEKEN PIL 0,60GFA RT 24UN CX - 24 3 694,00 231,33 0,432",
            MIN_LINE_LENGTH
        ));
        assert!(is_table_line(
            "ITEM SECUNDARIO DOC 405 SEM FAMILIA EB-10 2 450,50 225,25 0,380",
            MIN_LINE_LENGTH
        ));
    }

    #[test]
    fn test_family_prefix_accepts_malformed_reference() {
        let line = "refr fys guarana 0,350lt des 12un pbr  ?? 12  4  80,00 20,00 0,168";
        assert!(is_table_line(line, MIN_LINE_LENGTH));
    }

    #[test]
    fn test_noise_rejected() {
        let line = "Relatorio emitido em 12/05/2024 as 14:32 pelo usuario ADMIN";
        assert_eq!(classify_line(line, MIN_LINE_LENGTH), Err(LineError::NotTableLine));
    }

    #[test]
    fn test_fixed_layout_lines() {
        let rows = fixed_layout_lines(DUMP);
        assert_eq!(rows.len(), 5);
        assert!(rows[0].trim_start().starts_with("021/001"));
        assert!(rows[4].trim_start().starts_with("360/001"));
    }

    #[test]
    fn test_fixed_layout_without_header() {
        let text = "    021/001    CERV HEINEKEN PIL 0,60GFA RT 24UN          CX - 24";
        assert!(fixed_layout_lines(text).is_empty());
    }

    #[test]
    fn test_filter_keeps_order() {
        let lines = vec![
            "CERV B 0,60GFA RT 24UN PLUS PADDING CX - 24 1 10,00 10,00 0,144",
            "short",
            "CERV A 0,60GFA RT 24UN PLUS PADDING CX - 24 2 20,00 10,00 0,288",
        ];
        let kept = LineClassifier::default().filter(lines.iter().copied());
        assert_eq!(kept, vec![lines[0], lines[2]]);
    }
}
