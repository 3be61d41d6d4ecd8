//! Summary line-item records and order-origin tallies.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Unit volume used when the source column is blank.
pub const DEFAULT_UNIT_VOLUME: &str = "0,000";

/// Description given to records whose columns could not be identified.
pub const UNIDENTIFIED_DESCRIPTION: &str = "descrição não identificada";

/// One product row of the "RESUMO FINAL" block.
///
/// Every numeric column is kept exactly as formatted in the report
/// (comma decimal separator, dot thousands separator). Coercion happens only
/// in the aggregator. The field order mirrors the column order of the report
/// and is also the serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product code (e.g. "021/001"). Only present in fixed-layout dumps.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,

    /// Product description (e.g. "CERV HEINEKEN PIL 0,60GFA RT 24UN").
    pub description: String,

    /// Packaging reference (e.g. "CX - 24").
    pub reference: String,

    /// Case/unit count.
    pub case_unit: String,

    /// Total monetary value (e.g. "1.167,38").
    pub total_value: String,

    /// Average price per case/unit.
    pub average_price: String,

    /// Volume in hectoliters (e.g. "0,432").
    pub unit_volume: String,
}

impl Product {
    /// Build a record from the six summary columns.
    ///
    /// A blank unit volume becomes [`DEFAULT_UNIT_VOLUME`].
    pub fn new(
        description: impl Into<String>,
        reference: impl Into<String>,
        case_unit: impl Into<String>,
        total_value: impl Into<String>,
        average_price: impl Into<String>,
        unit_volume: impl Into<String>,
    ) -> Self {
        let unit_volume = unit_volume.into();
        let unit_volume = if unit_volume.trim().is_empty() {
            DEFAULT_UNIT_VOLUME.to_string()
        } else {
            unit_volume.trim().to_string()
        };

        Self {
            code: String::new(),
            description: description.into().trim().to_string(),
            reference: reference.into().trim().to_string(),
            case_unit: case_unit.into().trim().to_string(),
            total_value: total_value.into().trim().to_string(),
            average_price: average_price.into().trim().to_string(),
            unit_volume,
        }
    }

    /// Attach the product code column.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into().trim().to_string();
        self
    }

    /// Placeholder for a line whose columns could not be identified.
    ///
    /// Only diagnostic pipelines produce it; it never reaches aggregated output.
    pub fn unidentified() -> Self {
        Self::new(UNIDENTIFIED_DESCRIPTION, "", "0", "0,00", "0,00", "")
    }

    /// Whether this is the [`Product::unidentified`] placeholder.
    pub fn is_sentinel(&self) -> bool {
        self.description == UNIDENTIFIED_DESCRIPTION
    }
}

/// Tally of orders per channel.
///
/// The total is always derived from the two channel counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderOrigins {
    /// Orders placed through the SFA portal ("Origem: R").
    pub sfa_via_portal: u32,

    /// Orders placed through the Heishop B2B storefront ("Origem: G").
    pub heishop_b2b: u32,
}

impl OrderOrigins {
    pub fn new(sfa_via_portal: u32, heishop_b2b: u32) -> Self {
        Self {
            sfa_via_portal,
            heishop_b2b,
        }
    }

    /// Sum of both channels, saturating at `u32::MAX`.
    pub fn total_orders(&self) -> u32 {
        self.sfa_via_portal.saturating_add(self.heishop_b2b)
    }

    /// True when both channels are zero.
    pub fn is_empty(&self) -> bool {
        self.total_orders() == 0
    }
}

impl Serialize for OrderOrigins {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OrderOrigins", 3)?;
        state.serialize_field("sfa_via_portal", &self.sfa_via_portal)?;
        state.serialize_field("heishop_b2b", &self.heishop_b2b)?;
        state.serialize_field("total_orders", &self.total_orders())?;
        state.end()
    }
}

/// Which extraction layer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Strict JSON returned by the AI service.
    Json,
    /// `[TABLE_START]`/`[TABLE_END]` delimited text returned by the AI service.
    Delimited,
    /// Line-by-line fallback over unstructured text.
    RawText,
    /// Column-aligned dump parsed by fixed offsets.
    FixedLayout,
}

/// Products and origin counts produced by one extraction.
///
/// Assigned to a report only once fully built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub products: Vec<Product>,
    pub origins: OrderOrigins,
    pub method: ExtractionMethod,
}

impl ExtractionResult {
    pub fn new(products: Vec<Product>, origins: OrderOrigins, method: ExtractionMethod) -> Self {
        Self {
            products,
            origins,
            method,
        }
    }

    /// An empty result is valid: no line matched any strategy.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_volume_defaults() {
        let product = Product::new("CERV X", "CX - 24", "3", "694,00", "231,33", "   ");
        assert_eq!(product.unit_volume, "0,000");
    }

    #[test]
    fn test_origins_total_is_derived() {
        let origins = OrderOrigins::new(3, 4);
        assert_eq!(origins.total_orders(), 7);

        let json = serde_json::to_value(origins).unwrap();
        assert_eq!(json["total_orders"], 7);

        // A stale total in the input is ignored.
        let parsed: OrderOrigins =
            serde_json::from_str(r#"{"sfa_via_portal":1,"heishop_b2b":2,"total_orders":99}"#)
                .unwrap();
        assert_eq!(parsed.total_orders(), 3);
    }

    #[test]
    fn test_origins_total_saturates() {
        let origins = OrderOrigins::new(u32::MAX, 1);
        assert_eq!(origins.total_orders(), u32::MAX);
        assert!(!origins.is_empty());
    }

    #[test]
    fn test_field_order_is_stable() {
        let product = Product::new("D", "CX - 1", "1", "1,00", "1,00", "0,010").with_code("021/001");
        let json = serde_json::to_string(&product).unwrap();
        let positions: Vec<usize> = [
            "\"code\"",
            "\"description\"",
            "\"reference\"",
            "\"case_unit\"",
            "\"total_value\"",
            "\"average_price\"",
            "\"unit_volume\"",
        ]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_sentinel() {
        assert!(Product::unidentified().is_sentinel());
        assert!(!Product::new("CERV", "CX - 1", "1", "1,00", "1,00", "").is_sentinel());
    }
}
