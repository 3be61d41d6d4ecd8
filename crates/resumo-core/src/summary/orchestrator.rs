//! Extraction orchestrator.
//!
//! Sends the document to an [`ExtractionBackend`] and turns whatever comes
//! back into an [`ExtractionResult`]. Only a failed call is an error; a
//! response that cannot be read as JSON degrades to the delimited/raw-text
//! parse of the same text.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::ai::{ExtractionBackend, ResponseFormat};
use crate::error::ExtractionError;
use crate::models::product::{ExtractionMethod, ExtractionResult, OrderOrigins, Product};

use super::parser::SummaryParser;
use super::rules::{format_monetary, format_volume, resolve_origins};

/// Product record as written by the AI service.
///
/// Accepts the English schema and the Portuguese one used by the prompt.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonProduct {
    #[serde(alias = "descricao", deserialize_with = "lenient_string")]
    description: String,
    #[serde(alias = "referencia", deserialize_with = "lenient_string")]
    reference: String,
    #[serde(rename = "caseUnit", alias = "case_unit", alias = "caixa_unid", deserialize_with = "lenient_string")]
    case_unit: String,
    #[serde(rename = "totalValue", alias = "total_value", alias = "valor_total", deserialize_with = "lenient_amount")]
    total_value: String,
    #[serde(rename = "averagePrice", alias = "average_price", alias = "preco_medio", deserialize_with = "lenient_amount")]
    average_price: String,
    #[serde(rename = "unitVolume", alias = "unit_volume", alias = "un_volume", deserialize_with = "lenient_volume")]
    unit_volume: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonPayload {
    products: Option<Vec<JsonProduct>>,
    #[serde(rename = "sfaCount", alias = "sfa_count", deserialize_with = "lenient_count")]
    sfa_count: Option<u32>,
    #[serde(rename = "heishopCount", alias = "heishop_count", deserialize_with = "lenient_count")]
    heishop_count: Option<u32>,
}

/// Strings, numbers and null all become text.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Money as written in the report. JSON numbers are rendered pt-BR
/// ("1.167,38") so they read back through the same parser as text.
fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    lenient_numeric(deserializer, format_monetary)
}

/// Volume as written in the report; JSON numbers become "0,432".
fn lenient_volume<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    lenient_numeric(deserializer, format_volume)
}

fn lenient_numeric<'de, D: Deserializer<'de>>(
    deserializer: D,
    format: fn(Decimal) -> String,
) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        serde_json::Value::Number(n) => {
            let raw = n.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .map(format)
                .unwrap_or(raw)
        }
        other => other.to_string(),
    })
}

/// Counts may arrive as numbers or numeric strings. Values outside `u32`
/// are treated as absent.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl From<JsonProduct> for Product {
    fn from(p: JsonProduct) -> Self {
        Product::new(
            p.description,
            p.reference,
            p.case_unit,
            p.total_value,
            p.average_price,
            p.unit_volume,
        )
    }
}

/// Slice from the first `{` to the last `}`.
fn json_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Orchestrates one extraction against an AI backend.
pub struct Extractor<B: ExtractionBackend> {
    backend: B,
    format: ResponseFormat,
    parser: SummaryParser,
}

impl<B: ExtractionBackend> Extractor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            format: ResponseFormat::default(),
            parser: SummaryParser::new(),
        }
    }

    /// Set the response format requested in the prompt.
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the parser used for delimited and raw-text responses.
    pub fn with_parser(mut self, parser: SummaryParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Extract products and origin counts from a PDF.
    ///
    /// Fails only when the backend call fails. An empty product list is a
    /// valid result.
    pub async fn extract(&self, document: &[u8]) -> Result<ExtractionResult, ExtractionError> {
        let response = self.backend.invoke(document, self.format.prompt()).await?;
        let result = self.interpret(&response);

        info!(
            "{} returned {} products via {:?} ({} orders)",
            self.backend.name(),
            result.products.len(),
            result.method,
            result.origins.total_orders()
        );
        Ok(result)
    }

    /// Interpret a response text: JSON first, then the fallback chain.
    pub fn interpret(&self, response: &str) -> ExtractionResult {
        let Some(json) = self.parse_json(response) else {
            return self.parser.parse_response(response);
        };

        if json.is_empty() {
            let fallback = self.parser.parse_response(response);
            if !fallback.is_empty() {
                debug!(
                    "JSON had no products, fallback found {}",
                    fallback.products.len()
                );
                return fallback;
            }
        }

        json
    }

    fn parse_json(&self, response: &str) -> Option<ExtractionResult> {
        let slice = json_slice(response)?;

        let payload: JsonPayload = match serde_json::from_str(slice) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("AI response is not valid JSON ({}), using text fallback", e);
                return None;
            }
        };

        let products: Vec<Product> = payload
            .products
            .unwrap_or_default()
            .into_iter()
            .map(Product::from)
            .filter(|p| !p.description.is_empty() && !p.is_sentinel())
            .collect();

        let structured = match (payload.sfa_count, payload.heishop_count) {
            (None, None) => None,
            (sfa, heishop) => Some(OrderOrigins::new(sfa.unwrap_or(0), heishop.unwrap_or(0))),
        };
        let origins = resolve_origins(structured, response);

        Some(ExtractionResult::new(products, origins, ExtractionMethod::Json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Inclusion, aggregate};
    use crate::catalog::BrandCatalog;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Backend returning a canned response and recording the prompt.
    struct MockBackend {
        response: Result<String, TransportError>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockBackend {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: TransportError) -> Self {
            Self {
                response: Err(err),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ExtractionBackend for MockBackend {
        async fn invoke(&self, _document: &[u8], prompt: &str) -> Result<String, TransportError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response.clone()
        }
    }

    const JSON_RESPONSE: &str = r#"Aqui está o resultado:
```json
{
  "products": [
    {
      "descricao": "CERV HEINEKEN PIL 0,60GFA RT 24UN",
      "referencia": "CX - 24",
      "caixa_unid": 3,
      "valor_total": "694,00",
      "preco_medio": "231,33",
      "un_volume": "0,432"
    },
    {
      "description": "REFR FYS GUARANA 0,350LT DES 12UN PBR",
      "reference": "CX - 12",
      "caseUnit": "40",
      "totalValue": "1.167,38",
      "averagePrice": "29,18",
      "unitVolume": ""
    },
    { "descricao": "" }
  ],
  "sfa_count": 2,
  "heishop_count": "1"
}
```"#;

    #[tokio::test]
    async fn test_extract_json() {
        let extractor = Extractor::new(MockBackend::ok(JSON_RESPONSE));
        let result = extractor.extract(b"%PDF").await.unwrap();

        assert_eq!(result.method, ExtractionMethod::Json);
        assert_eq!(result.products.len(), 2);
        assert_eq!(result.products[0].case_unit, "3");
        assert_eq!(result.products[1].total_value, "1.167,38");
        assert_eq!(result.products[1].unit_volume, "0,000");
        assert_eq!(result.origins, OrderOrigins::new(2, 1));
        assert_eq!(result.origins.total_orders(), 3);
    }

    #[tokio::test]
    async fn test_prompt_follows_response_format() {
        let extractor = Extractor::new(MockBackend::ok("")).with_response_format(ResponseFormat::Delimited);
        extractor.extract(b"%PDF").await.unwrap();

        let prompts = extractor.backend().prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("[TABLE_START]"));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let extractor = Extractor::new(MockBackend::failing(TransportError::Quota("exhausted".into())));
        let err = extractor.extract(b"%PDF").await.unwrap_err();
        assert_eq!(err, ExtractionError::Transport(TransportError::Quota("exhausted".into())));
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back_to_text() {
        let response = "{ products: [ oops\n\
                        [TABLE_START]\n\
                        CERV HEINEKEN PIL 0,60GFA RT 24UN CX - 24 3 694,00 231,33 0,432\n\
                        [TABLE_END]\n\
                        SFA_COUNT: 1\n\
                        HEISHOP_COUNT: 0\n\
                        }";
        let extractor = Extractor::new(MockBackend::ok(response));
        let result = extractor.extract(b"%PDF").await.unwrap();

        assert_eq!(result.method, ExtractionMethod::Delimited);
        assert_eq!(result.products.len(), 1);
        assert_eq!(result.products[0].reference, "CX - 24");
        assert_eq!(result.origins, OrderOrigins::new(1, 0));
    }

    #[tokio::test]
    async fn test_empty_response_is_valid() {
        let extractor = Extractor::new(MockBackend::ok("Não encontrei o bloco RESUMO FINAL."));
        let result = extractor.extract(b"%PDF").await.unwrap();

        assert!(result.is_empty());
        assert_eq!(result.method, ExtractionMethod::RawText);
        assert_eq!(result.origins.total_orders(), 0);
    }

    #[test]
    fn test_missing_products_key_is_empty() {
        let extractor = Extractor::new(MockBackend::ok(""));
        let result = extractor.interpret(r#"{"sfa_count": 0, "heishop_count": 0}"#);

        assert_eq!(result.method, ExtractionMethod::Json);
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_json_loses_to_nonempty_fallback() {
        let response = "{\"products\": []}\n\
                        CERV HEINEKEN PIL 0,60GFA RT 24UN CX - 24 3 694,00 231,33 0,432\n";
        let extractor = Extractor::new(MockBackend::ok(""));
        let result = extractor.interpret(response);

        assert_eq!(result.method, ExtractionMethod::RawText);
        assert_eq!(result.products.len(), 1);
    }

    #[test]
    fn test_zero_counts_rescan_response() {
        let response = "{\"products\": [], \"sfa_count\": 0, \"heishop_count\": 0}\n\
                        Origem: R = SFA via portal\nOrigem: R = SFA via portal\n";
        let extractor = Extractor::new(MockBackend::ok(""));
        let result = extractor.interpret(response);
        assert_eq!(result.origins, OrderOrigins::new(2, 0));
    }

    #[test]
    fn test_numeric_amounts_read_as_report_text() {
        let response = r#"{"products": [{
            "descricao": "REFR FYS GUARANA 0,350LT DES 12UN PBR",
            "referencia": "CX - 12",
            "caixa_unid": 40,
            "valor_total": 1167.38,
            "preco_medio": 29.18,
            "un_volume": 0.432
        }]}"#;
        let extractor = Extractor::new(MockBackend::ok(""));
        let result = extractor.interpret(response);

        let product = &result.products[0];
        assert_eq!(product.total_value, "1.167,38");
        assert_eq!(product.average_price, "29,18");
        assert_eq!(product.unit_volume, "0,432");

        let metrics = aggregate(&result.products, &Inclusion::All, &BrandCatalog::empty());
        assert_eq!(metrics.total_value, Decimal::new(116738, 2));
        assert_eq!(metrics.total_volume, Decimal::new(432, 3));
    }

    #[test]
    fn test_out_of_range_count_is_absent() {
        let extractor = Extractor::new(MockBackend::ok(""));
        let result = extractor.interpret(r#"{"products": [], "sfa_count": 4294967296, "heishop_count": 2}"#);
        assert_eq!(result.origins, OrderOrigins::new(0, 2));
    }

    #[test]
    fn test_max_counts_do_not_overflow_total() {
        let extractor = Extractor::new(MockBackend::ok(""));
        let result = extractor.interpret(r#"{"products": [], "sfa_count": 4294967295, "heishop_count": 1}"#);
        assert_eq!(result.origins, OrderOrigins::new(u32::MAX, 1));
        assert_eq!(result.origins.total_orders(), u32::MAX);
    }

    #[test]
    fn test_json_slice() {
        assert_eq!(json_slice("abc {\"a\": {}} def"), Some("{\"a\": {}}"));
        assert_eq!(json_slice("} reversed {"), None);
        assert_eq!(json_slice("no braces"), None);
    }
}
