//! Report aggregation: totals and brand/category rollups.
//!
//! Amounts are summed as [`Decimal`]; a value that does not parse counts as
//! zero. Rollups only include products present in the [`BrandCatalog`],
//! totals include every selected product.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::catalog::BrandCatalog;
use crate::models::product::Product;
use crate::summary::rules::{parse_count, parse_decimal, parse_monetary};

/// Which products of a report take part in the aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Inclusion {
    /// Every product.
    #[default]
    All,
    /// Only products whose description is in the set.
    Only(HashSet<String>),
}

impl Inclusion {
    /// Every description except the given ones.
    pub fn excluding<'a>(products: &'a [Product], excluded: impl IntoIterator<Item = &'a str>) -> Self {
        let excluded: HashSet<&str> = excluded.into_iter().collect();
        if excluded.is_empty() {
            return Self::All;
        }

        Self::Only(
            products
                .iter()
                .map(|p| p.description.as_str())
                .filter(|d| !excluded.contains(d))
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn includes(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(descriptions) => descriptions.contains(&product.description),
        }
    }
}

/// Cases and volume summed for one brand or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rollup {
    pub name: String,
    pub cases: i64,
    pub volume: Decimal,
}

/// Aggregated figures for one report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportMetrics {
    pub total_value: Decimal,
    pub total_volume: Decimal,
    pub item_count: usize,
    pub brands: Vec<Rollup>,
    pub categories: Vec<Rollup>,
}

/// Accumulates rollups keeping first-seen order.
#[derive(Default)]
struct RollupBuilder {
    index: HashMap<String, usize>,
    rollups: Vec<Rollup>,
}

impl RollupBuilder {
    fn add(&mut self, name: &str, cases: i64, volume: Decimal) {
        let i = *self.index.entry(name.to_string()).or_insert_with(|| {
            self.rollups.push(Rollup {
                name: name.to_string(),
                cases: 0,
                volume: Decimal::ZERO,
            });
            self.rollups.len() - 1
        });
        self.rollups[i].cases += cases;
        self.rollups[i].volume += volume;
    }

    /// Descending by volume; `sort_by` is stable so ties keep first-seen order.
    fn finish(mut self) -> Vec<Rollup> {
        self.rollups.sort_by(|a, b| b.volume.cmp(&a.volume));
        self.rollups
    }
}

fn or_zero<T: Default>(value: Option<T>, field: &str, raw: &str) -> T {
    value.unwrap_or_else(|| {
        debug!("Unparseable {} {:?}, counting as zero", field, raw);
        T::default()
    })
}

/// Aggregate the included products of a report.
pub fn aggregate(products: &[Product], inclusion: &Inclusion, catalog: &BrandCatalog) -> ReportMetrics {
    let mut metrics = ReportMetrics::default();
    let mut brands = RollupBuilder::default();
    let mut categories = RollupBuilder::default();

    for product in products.iter().filter(|p| !p.is_sentinel() && inclusion.includes(p)) {
        let value = or_zero(parse_monetary(&product.total_value), "total value", &product.total_value);
        let volume = or_zero(parse_decimal(&product.unit_volume), "unit volume", &product.unit_volume);

        metrics.total_value += value;
        metrics.total_volume += volume;
        metrics.item_count += 1;

        if let Some(entry) = catalog.get(&product.description) {
            let cases = or_zero(parse_count(&product.case_unit), "case count", &product.case_unit);
            brands.add(&entry.brand, cases, volume);
            categories.add(&entry.category, cases, volume);
        } else {
            debug!("No catalog entry for {:?}", product.description);
        }
    }

    metrics.brands = brands.finish();
    metrics.categories = categories.finish();
    metrics
}
