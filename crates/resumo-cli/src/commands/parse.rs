//! Parse command - run the line parsers over an extracted text dump.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use resumo_core::summary::rules::{ColumnStrategy, ParseMode};
use resumo_core::{Inclusion, Report, SummaryParser, aggregate};
use resumo_core::models::ReportState;

use super::analyze::load_catalog;
use super::config;
use crate::output::{self, Analysis, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file (a PDF text dump or a saved AI response)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Which parser to run
    #[arg(long, value_enum, default_value = "auto")]
    layout: Layout,

    /// Column strategy for free-form lines (fixed, anchor, tail)
    #[arg(long)]
    strategy: Option<ColumnStrategy>,

    /// Reject (strict) or zero-fill (lenient) incomplete lines
    #[arg(long)]
    mode: Option<ParseMode>,

    /// Leave a product out of totals and rollups (exact description, repeatable)
    #[arg(long = "exclude", value_name = "DESCRIPTION")]
    exclude: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Layout {
    /// Column-aligned block first, free-form lines otherwise
    Auto,
    /// Column-aligned "RESUMO FINAL" block only
    Fixed,
    /// Free-form lines of a PDF text dump only
    Free,
    /// Saved AI response (delimited or free-form lines)
    Response,
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = fs::read_to_string(&args.input)?;
    info!("Parsing {} ({} bytes)", args.input.display(), text.len());

    let mut parser = SummaryParser::from_config(&config.extraction);
    if let Some(strategy) = args.strategy {
        parser = parser.with_strategy(strategy);
    }
    if let Some(mode) = args.mode {
        parser = parser.with_mode(mode);
    }

    let result = match args.layout {
        Layout::Auto => parser.parse_text(&text),
        Layout::Fixed => parser.parse_fixed_layout(&text),
        Layout::Free => parser.parse_free_text(&text),
        Layout::Response => parser.parse_response(&text),
    };
    let method = result.method;

    let mut report = Report::local(&args.input, Some(text.len() as u64));
    report.state = ReportState::Analyzed(result);

    let catalog = load_catalog(&config)?;
    let inclusion = Inclusion::excluding(report.products(), args.exclude.iter().map(String::as_str));
    let metrics = aggregate(report.products(), &inclusion, &catalog);

    let analysis = Analysis {
        report: &report,
        method: Some(method),
        metrics: &metrics,
        catalog: &catalog,
    };
    let rendered = output::render(&analysis, args.format)?;
    output::write(&rendered, args.output.as_deref())
}
