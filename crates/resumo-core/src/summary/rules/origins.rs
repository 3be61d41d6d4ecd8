//! Order-origin counting.
//!
//! Two independent readings of the same text:
//! - structured `SFA_COUNT:` / `HEISHOP_COUNT:` lines written by the AI service
//! - literal occurrences of the origin marker phrases in the report itself

use regex::Regex;
use tracing::debug;

use crate::models::product::OrderOrigins;

use super::patterns::{HEISHOP_COUNT, HEISHOP_MARKER, SFA_COUNT, SFA_MARKER};

/// Parse the structured count lines.
///
/// Returns `None` when neither count line is present.
pub fn count_structured(text: &str) -> Option<OrderOrigins> {
    let sfa = read_count(&SFA_COUNT, text);
    let heishop = read_count(&HEISHOP_COUNT, text);

    if sfa.is_none() && heishop.is_none() {
        return None;
    }

    Some(OrderOrigins::new(sfa.unwrap_or(0), heishop.unwrap_or(0)))
}

fn read_count(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text).and_then(|caps| caps[1].parse().ok())
}

/// Count case-sensitive occurrences of the marker phrases.
pub fn count_literal(text: &str) -> OrderOrigins {
    OrderOrigins::new(
        u32::try_from(text.matches(SFA_MARKER).count()).unwrap_or(u32::MAX),
        u32::try_from(text.matches(HEISHOP_MARKER).count()).unwrap_or(u32::MAX),
    )
}

/// Combine structured counts with a literal re-scan of `raw_text`.
///
/// Zero/zero is read as "counts not populated" rather than "no orders",
/// so it triggers the re-scan just like absent counts do.
pub fn resolve_origins(structured: Option<OrderOrigins>, raw_text: &str) -> OrderOrigins {
    match structured {
        Some(origins) if !origins.is_empty() => origins,
        _ => {
            let literal = count_literal(raw_text);
            debug!(
                sfa = literal.sfa_via_portal,
                heishop = literal.heishop_b2b,
                "Structured origin counts absent or zero, using literal markers"
            );
            literal
        }
    }
}

/// Count origins in `text`, structured lines first.
pub fn count_origins(text: &str) -> OrderOrigins {
    resolve_origins(count_structured(text), text)
}
