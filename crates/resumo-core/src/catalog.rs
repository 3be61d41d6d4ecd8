//! Brand catalog: product description to brand, category and case volume.
//!
//! Lookups are case-insensitive on the full description. The catalog is
//! immutable once built and injected into the aggregator.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Catalog data for one product description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Brand tier ("PREMIUM", "MAINSTREAM", "FYS", ...).
    #[serde(alias = "marca")]
    pub brand: String,

    /// Fundamentals category ("RGB", "SINGLE SERVE", "N/A", ...).
    #[serde(alias = "fundamentos")]
    pub category: String,

    /// Hectolitres per case.
    #[serde(alias = "volUnit", alias = "vol_unit")]
    pub unit_volume_per_case: Decimal,
}

impl CatalogEntry {
    pub fn new(brand: impl Into<String>, category: impl Into<String>, unit_volume_per_case: Decimal) -> Self {
        Self {
            brand: brand.into(),
            category: category.into(),
            unit_volume_per_case,
        }
    }
}

/// (description, brand, category, case volume in thousandths of a hectolitre)
const MASTER_TABLE: &[(&str, &str, &str, i64)] = &[
    // Cerveja 600ml
    ("CERV SCHIN PILS 0,60LGFA 24UN", "ECONOMY", "RGB", 144),
    ("CERV HEINEKEN PIL 0,60GFA RT 24UN", "PREMIUM", "RGB", 144),
    ("CERV AMSTEL LAGER 0,60L GFA RT 24UN", "MAINSTREAM", "RGB", 144),
    ("CERV DEVASSA LAGER N 0,60LGFA RT24UNPH", "MAINSTREAM", "RGB", 144),
    // Cerveja litrão
    ("CERV SCHIN PILS 1LGFA 12UN", "ECONOMY", "RGB", 120),
    ("CERV DEVASSA LAGER N 1LGFA RT 12UN PT1", "MAINSTREAM", "RGB", 120),
    ("CERV AMSTEL PIL 1LGFA RT 12UN", "MAINSTREAM", "RGB", 120),
    // Cerveja litrinho
    ("CERV DEVASSA LAGER N 0,30LGFA RT 24UN", "MAINSTREAM", "RGB", 72),
    ("CERV AMSTEL LAGER 0,30LGFA RT 24UN", "MAINSTREAM", "RGB", 72),
    // Cerveja lata 350ml
    ("CERV SCHIN PILS 0,350LT 12UN PBR", "ECONOMY", "N/A", 42),
    ("CERV BADEN PILCRIST 0,350LT SLEK2X6UNPBR", "MAINSTREAM", "N/A", 42),
    ("CERV HEINEKEN PIL 0,350LT SLEEKDES12UNPB", "PREMIUM", "N/A", 42),
    ("CERV HEINEKEN 0,0% 0,350LTSLEEKDES12UNPB", "PREMIUM", "N/A", 42),
    ("CERV BADEN WITBIER 0,350LT SLEEK2X6UNPBR", "CRAFT", "N/A", 42),
    ("CERV BADEN IPA 0,350LT SLEK2X6UNPBR", "CRAFT", "N/A", 42),
    ("CERV LAGUNITAS IPA 0,350LT SLE", "CRAFT", "N/A", 42),
    ("CERV BLUE MOON 0,350LT SLEEK CART12UNPBR", "CRAFT", "N/A", 42),
    ("CERV DEVAS LAGER N 0,350LTSLEEKDES12UNPB", "MAINSTREAM", "N/A", 42),
    ("CERV AMSTEL LAGER 0,350LT SLEEK 12UN PBR", "MAINSTREAM", "N/A", 42),
    // Cerveja lata 269ml / 473ml
    ("CERV SCHIN PILS 0,473LT 12UN PBR", "ECONOMY", "N/A", 57),
    ("CERV DEVAS LAGER N 0,473LT DES 12UN PBR", "MAINSTREAM", "N/A", 57),
    ("CERV AMSTEL LAGER 0,473LT DES 12UNPBR", "MAINSTREAM", "N/A", 57),
    ("CERV HEINEKEN PIL 0,269LT DESC 8UN PB", "PREMIUM", "N/A", 22),
    ("CERV HEINEKEN 0,0% 0,269LT DESC 8UN PBR", "PREMIUM", "N/A", 22),
    ("CERV AMSTEL ULTRA 0,269LT 12UNPBR", "MAINSTREAM", "N/A", 32),
    ("CERV AMSTEL LAGER 0,269LT SHR 12UNPBR", "MAINSTREAM", "N/A", 32),
    // Cervejas especiais
    ("CERV BADEN PILSCRIST 0,60LGFA 12UN PB", "CRAFT", "N/A", 72),
    ("CERV BADEN GOLDEN ALE 0,60LGFA 12UN PBR", "CRAFT", "N/A", 72),
    ("CERV BADEN WITBIER 0,60LGFA 12UN PBR", "CRAFT", "N/A", 72),
    ("CERV BADEN AMERICAN IPA 0,60LGFA 12UN", "CRAFT", "N/A", 72),
    ("CERV HEINEKEN PIL 0,6GFA DESC 12UNPBR", "PREMIUM", "N/A", 72),
    ("CERV LAGUNITAS IPA 0,355LN DES 12UN PBR", "CRAFT", "N/A", 43),
    ("CERV BLUE MOON 0,350LT SLEEK CART 12 UN", "CRAFT", "N/A", 85),
    ("DRAFT BEER HEINEKEN PIL 5L DESC 2UNPBR", "PREMIUM", "N/A", 100),
    ("CERV HEINEKEN PIL 0,250GFA DESC4X6UNPBR", "PREMIUM", "N/A", 60),
    ("CERV HEINEKEN PIL 0,330GFA DESC 4X6UN PB", "PREMIUM", "N/A", 79),
    ("CERV PRAYA LAGER 0,330GFA DESC 4X6UNPBR", "PREMIUM", "N/A", 79),
    ("CERV HEINEKEN 0,0% 0,330GFA DES 4X6UNPBR", "PREMIUM", "N/A", 79),
    ("CERV AMSTEL ULTRA 0,275LN DES 2X6UN PBR", "MAINSTREAM", "N/A", 33),
    // Chopp
    ("CHOP HEINEKEN PIL 30LBARRIL RT", "PREMIUM", "RGB", 300),
    ("CHOP HEINEKEN PIL 50LBARRIL RT", "PREMIUM", "RGB", 500),
    ("DRAFT BEER AMSTEL LAGER 30L PBR2", "MAINSTREAM", "RGB", 300),
    ("DRAFT BEER AMSTEL LAGER 50L PBR2", "MAINSTREAM", "RGB", 500),
    // Refrigerante FYS
    ("REFR FYS GUARANA 0,350LT DES 12UN PBR", "FYS", "SINGLE SERVE", 42),
    ("REFR FYS LARANJA 0,350LT DES 12UN PBR", "FYS", "SINGLE SERVE", 42),
    ("REFR FYS LIMAO 0,350LT DES 12UN PBR", "FYS", "SINGLE SERVE", 42),
    ("REFR FYS GUARANA ZERO 0,350LT DESC12UNPB", "FYS", "SINGLE SERVE", 42),
    ("REFR FYS TONICA 0,350LT DES 12UN PBR", "FYS", "SINGLE SERVE", 42),
    ("REFR FYS TONICA ZERO 0,350LT DES 12UN PB", "FYS", "SINGLE SERVE", 42),
    ("REFR FYS LIMAO ZERO 0,350LT DESC 12UNPBR", "FYS", "SINGLE SERVE", 42),
    // Água mineral
    ("AGUA SCHIN MINER S/GAS 0,50LPET 12UN PBR", "AGUA SCHIN", "SINGLE SERVE", 60),
    ("AGUA SCHIN MINER C/GAS 0,50LPET 12UN PBR", "AGUA SCHIN", "SINGLE SERVE", 60),
    // Skinka
    ("BBMI SKINKA FRUTCITRIC 0,45LPET 12UN PBR", "SKINKA", "SINGLE SERVE", 54),
    ("BBMI SKINKA FRUTVERM 0,45LPET 12UN PBR", "SKINKA", "SINGLE SERVE", 54),
    ("BBMI SKINKA UVA 0,45LPET DES 12UN PBR", "SKINKA", "SINGLE SERVE", 54),
];

/// Read-only mapping from upper-cased description to [`CatalogEntry`].
#[derive(Debug, Clone, Default)]
pub struct BrandCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl BrandCatalog {
    /// Empty catalog: every product is unmapped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The master table shipped with the tool.
    pub fn builtin() -> Self {
        MASTER_TABLE
            .iter()
            .map(|(description, brand, category, millis)| {
                (
                    description.to_string(),
                    CatalogEntry::new(*brand, *category, Decimal::new(*millis, 3)),
                )
            })
            .collect()
    }

    /// Load a JSON object `{ "<description>": { brand, category, unit_volume_per_case } }`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let entries: HashMap<String, CatalogEntry> = serde_json::from_str(&content)?;
        info!(
            "Loaded {} catalog entries from {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(entries.into_iter().collect())
    }

    /// Look up a description, ignoring case and surrounding whitespace.
    pub fn get(&self, description: &str) -> Option<&CatalogEntry> {
        self.entries.get(&description.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, CatalogEntry)> for BrandCatalog {
    fn from_iter<I: IntoIterator<Item = (String, CatalogEntry)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(description, entry)| (description.trim().to_uppercase(), entry))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::str::FromStr;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        let catalog = BrandCatalog::builtin();
        assert_eq!(catalog.len(), MASTER_TABLE.len());

        let entry = catalog.get("cerv heineken pil 0,60gfa rt 24un").unwrap();
        assert_eq!(entry.brand, "PREMIUM");
        assert_eq!(entry.category, "RGB");
        assert_eq!(entry.unit_volume_per_case, Decimal::from_str("0.144").unwrap());

        assert!(catalog.get("CERV DESCONHECIDA 0,60GFA").is_none());
    }

    #[test]
    fn test_from_file_accepts_both_key_styles() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "cerv nova lager 0,60gfa 24un": {{ "brand": "MAINSTREAM", "category": "RGB", "unit_volume_per_case": "0.144" }},
                "REFR FYS UVA 0,350LT DES 12UN PBR": {{ "marca": "FYS", "fundamentos": "SINGLE SERVE", "volUnit": 0.042 }}
            }}"#
        )
        .unwrap();

        let catalog = BrandCatalog::from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("CERV NOVA LAGER 0,60GFA 24UN").unwrap().brand, "MAINSTREAM");
        assert_eq!(catalog.get("refr fys uva 0,350lt des 12un pbr").unwrap().category, "SINGLE SERVE");
    }

    #[test]
    fn test_from_file_missing() {
        assert!(BrandCatalog::from_file("/nonexistent/catalog.json").is_err());
    }
}
