//! Analyze command - extract the summary block of a single report.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use resumo_core::models::ExtractionResult;
use resumo_core::{
    BrandCatalog, Extractor, GeminiBackend, Inclusion, Report, ResponseFormat, ResumoConfig,
    Session, SummaryParser, aggregate,
};

use super::config;
use crate::output::{self, Analysis, OutputFormat};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    extraction: ExtractionArgs,

    /// Leave a product out of totals and rollups (exact description, repeatable)
    #[arg(long = "exclude", value_name = "DESCRIPTION")]
    exclude: Vec<String>,
}

/// Options shared by every command that extracts a PDF.
#[derive(Args, Clone, Debug)]
pub struct ExtractionArgs {
    /// Skip the AI service and parse the PDF's embedded text locally
    #[arg(long)]
    pub offline: bool,

    /// Response format requested from the AI service (json or delimited)
    #[arg(long, value_name = "MODE")]
    pub format_mode: Option<ResponseFormat>,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Analyzing file: {}", args.input.display());
    let data = fs::read(&args.input)?;

    let report = Report::local(&args.input, Some(data.len() as u64));
    let id = report.id.clone();
    let mut session = Session::new();
    session.add_report(report);
    let selection = session.select(&id)?;

    let pb = spinner();
    pb.set_message("Extracting RESUMO FINAL...");

    let result = match extract_document(&data, &config, &args.extraction).await {
        Ok(result) => result,
        Err(e) => {
            pb.abandon_with_message("Extraction failed");
            session.fail(&selection);
            anyhow::bail!("{}\n\nRun the command again to retry.", e);
        }
    };
    pb.finish_with_message("Done");

    let method = result.method;
    let report = session.complete(&selection, result)?;

    let catalog = load_catalog(&config)?;
    let inclusion = Inclusion::excluding(report.products(), args.exclude.iter().map(String::as_str));
    let metrics = aggregate(report.products(), &inclusion, &catalog);

    let analysis = Analysis {
        report,
        method: Some(method),
        metrics: &metrics,
        catalog: &catalog,
    };
    let rendered = output::render(&analysis, args.format)?;
    output::write(&rendered, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

/// Run one document through the configured extraction path.
pub async fn extract_document(
    data: &[u8],
    config: &ResumoConfig,
    args: &ExtractionArgs,
) -> anyhow::Result<ExtractionResult> {
    let parser = SummaryParser::from_config(&config.extraction);

    if args.offline {
        debug!("Offline extraction from embedded PDF text");
        let text = resumo_core::pdf::extract_text(data)?;
        return Ok(parser.parse_text(&text));
    }

    let format = args.format_mode.unwrap_or(config.ai.response_format);
    let backend = GeminiBackend::from_config(&config.ai)?;
    let extractor = Extractor::new(backend)
        .with_response_format(format)
        .with_parser(parser);

    Ok(extractor.extract(data).await?)
}

/// Brand catalog from the configured file, or the built-in table.
pub fn load_catalog(config: &ResumoConfig) -> anyhow::Result<BrandCatalog> {
    match &config.catalog.path {
        Some(path) => {
            debug!("Loading brand catalog from {}", path.display());
            Ok(BrandCatalog::from_file(path)?)
        }
        None => Ok(BrandCatalog::builtin()),
    }
}

pub fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
