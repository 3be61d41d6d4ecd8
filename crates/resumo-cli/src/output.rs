//! Rendering of analysis results as text dashboard, JSON or CSV.

use std::fs;
use std::path::Path;

use console::style;
use serde::Serialize;

use resumo_core::catalog::BrandCatalog;
use resumo_core::models::{ExtractionMethod, OrderOrigins, Product, Report};
use resumo_core::summary::rules::{format_monetary, format_volume};
use resumo_core::{ReportMetrics, Rollup};

/// Shown instead of the tables when a report has no products.
pub const EMPTY_STATE_HINT: &str = "Nenhum produto encontrado no bloco RESUMO FINAL";

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one row per product)
    Csv,
    /// Plain text dashboard
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// One analyzed report with its aggregated metrics.
pub struct Analysis<'a> {
    pub report: &'a Report,
    pub method: Option<ExtractionMethod>,
    pub metrics: &'a ReportMetrics,
    pub catalog: &'a BrandCatalog,
}

#[derive(Serialize)]
struct AnalysisJson<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<ExtractionMethod>,
    origins: OrderOrigins,
    products: &'a [Product],
    metrics: &'a ReportMetrics,
}

pub fn render(analysis: &Analysis<'_>, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => render_json(analysis),
        OutputFormat::Csv => render_csv(analysis),
        OutputFormat::Text => Ok(render_text(analysis)),
    }
}

/// Write rendered output to `path`, or stdout when none is given.
pub fn write(rendered: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, rendered)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn render_json(analysis: &Analysis<'_>) -> anyhow::Result<String> {
    let output = AnalysisJson {
        id: &analysis.report.id,
        name: &analysis.report.name,
        method: analysis.method,
        origins: analysis.report.origins(),
        products: analysis.report.products(),
        metrics: analysis.metrics,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render_csv(analysis: &Analysis<'_>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "code",
        "description",
        "reference",
        "case_unit",
        "total_value",
        "average_price",
        "unit_volume",
        "brand",
        "category",
    ])?;

    for product in analysis.report.products() {
        let entry = analysis.catalog.get(&product.description);
        wtr.write_record([
            product.code.as_str(),
            product.description.as_str(),
            product.reference.as_str(),
            product.case_unit.as_str(),
            product.total_value.as_str(),
            product.average_price.as_str(),
            product.unit_volume.as_str(),
            entry.map(|e| e.brand.as_str()).unwrap_or(""),
            entry.map(|e| e.category.as_str()).unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn push_rollups(output: &mut String, title: &str, rollups: &[Rollup]) {
    output.push_str(&format!("{}\n", title));
    if rollups.is_empty() {
        output.push_str("  (nenhum produto mapeado)\n");
    }
    for rollup in rollups {
        output.push_str(&format!(
            "  {:<20} {:>6} cx {:>10} HL\n",
            rollup.name,
            rollup.cases,
            format_volume(rollup.volume)
        ));
    }
    output.push('\n');
}

fn render_text(analysis: &Analysis<'_>) -> String {
    let report = analysis.report;
    let metrics = analysis.metrics;
    let origins = report.origins();
    let mut output = String::new();

    output.push_str(&format!("Relatório: {}\n", report.name));
    if let Some(method) = analysis.method {
        output.push_str(&format!("Extração: {:?}\n", method));
    }
    output.push('\n');

    output.push_str(&format!("VALOR TOTAL       R$ {}\n", format_monetary(metrics.total_value)));
    output.push_str(&format!("SOMA UN VOLUME    {} HL\n", format_volume(metrics.total_volume)));
    output.push_str(&format!("ITENS             {}\n", metrics.item_count));
    output.push_str(&format!(
        "ORIGENS           SFA {} | HEISHOP {} | TOTAL {}\n",
        origins.sfa_via_portal,
        origins.heishop_b2b,
        origins.total_orders()
    ));
    output.push('\n');

    if report.products().is_empty() {
        output.push_str(EMPTY_STATE_HINT);
        output.push('\n');
        return output;
    }

    push_rollups(&mut output, "MARCAS", &metrics.brands);
    push_rollups(&mut output, "FUNDAMENTOS", &metrics.categories);

    output.push_str("PRODUTOS\n");
    for product in report.products() {
        output.push_str(&format!(
            "  {:<42} {:<10} {:>6} {:>12} {:>10} {:>8}\n",
            product.description,
            product.reference,
            product.case_unit,
            product.total_value,
            product.average_price,
            product.unit_volume
        ));
    }

    output
}
