//! Batch command - analyze every report matching a pattern.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use resumo_core::summary::rules::{format_monetary, format_volume};
use resumo_core::{BrandCatalog, Inclusion, Report, ReportMetrics, ResumoConfig, Session, aggregate};

use super::analyze::{ExtractionArgs, extract_document, load_catalog};
use super::config;
use crate::output::{self, Analysis, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input PDFs (e.g. "reports/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory for one file per report
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each report
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    extraction: ExtractionArgs,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of one report.
struct BatchEntry {
    path: PathBuf,
    report_id: String,
    metrics: Option<ReportMetrics>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = config::load(config_path)?;
    let catalog = load_catalog(&config)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} reports to analyze",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reports {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut session = Session::new();
    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let outcome = analyze_file(&mut session, &path, &config, &catalog, &args.extraction).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok((report_id, metrics)) => entries.push(BatchEntry {
                path,
                report_id,
                metrics: Some(metrics),
                error: None,
                processing_time_ms,
            }),
            Err(e) if args.continue_on_error => {
                warn!("Failed to analyze {}: {}", path.display(), e);
                entries.push(BatchEntry {
                    path,
                    report_id: String::new(),
                    metrics: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                });
            }
            Err(e) => {
                pb.abandon();
                error!("Failed to analyze {}: {}", path.display(), e);
                anyhow::bail!("Analysis failed for {}: {}", path.display(), e);
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for entry in &entries {
            let (Some(metrics), Some(report)) = (&entry.metrics, session.report(&entry.report_id)) else {
                continue;
            };

            let stem = entry
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("report");
            let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));

            let analysis = Analysis {
                report,
                method: None,
                metrics,
                catalog: &catalog,
            };
            fs::write(&output_path, output::render(&analysis, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &entries, &session)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = entries.iter().filter(|e| e.error.is_some()).collect();

    println!();
    println!(
        "{} Analyzed {} reports in {:?}",
        style("✓").green(),
        entries.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(entries.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed reports:").red());
        for entry in &failed {
            println!(
                "  - {}: {}",
                entry.path.display(),
                entry.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Add one PDF to the session, extract it and aggregate the result.
async fn analyze_file(
    session: &mut Session,
    path: &Path,
    config: &ResumoConfig,
    catalog: &BrandCatalog,
    extraction: &ExtractionArgs,
) -> anyhow::Result<(String, ReportMetrics)> {
    let data = fs::read(path)?;
    let report = Report::local(path, Some(data.len() as u64));
    let id = report.id.clone();
    session.add_report(report);
    let selection = session.select(&id)?;

    let result = match extract_document(&data, config, extraction).await {
        Ok(result) => result,
        Err(e) => {
            session.fail(&selection);
            return Err(e);
        }
    };

    let report = session.complete(&selection, result)?;
    let metrics = aggregate(report.products(), &Inclusion::All, catalog);
    Ok((id, metrics))
}

fn write_summary(path: &Path, entries: &[BatchEntry], session: &Session) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "products",
        "total_value",
        "total_volume",
        "sfa",
        "heishop",
        "total_orders",
        "processing_time_ms",
        "error",
    ])?;

    for entry in entries {
        let filename = entry.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let time = entry.processing_time_ms.to_string();

        match (&entry.metrics, session.report(&entry.report_id)) {
            (Some(metrics), Some(report)) => {
                let origins = report.origins();
                let fields = [
                    report.products().len().to_string(),
                    format_monetary(metrics.total_value),
                    format_volume(metrics.total_volume),
                    origins.sfa_via_portal.to_string(),
                    origins.heishop_b2b.to_string(),
                    origins.total_orders().to_string(),
                ];
                let mut record = vec![filename, "success"];
                record.extend(fields.iter().map(String::as_str));
                record.extend([time.as_str(), ""]);
                wtr.write_record(&record)?;
            }
            _ => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    time.as_str(),
                    entry.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
