//! Drive command - list, download and analyze reports in a remote folder.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use resumo_core::{
    EnvTokenProvider, GoogleDriveClient, Inclusion, RemoteFileSource, ResumoConfig, Session,
    aggregate,
};

use super::analyze::{ExtractionArgs, extract_document, load_catalog, spinner};
use super::config;
use crate::output::{self, Analysis, OutputFormat};

/// Arguments for the drive command.
#[derive(Args)]
pub struct DriveArgs {
    /// Folder id (default: drive.folder_id from the config)
    #[arg(long, global = true)]
    folder: Option<String>,

    #[command(subcommand)]
    command: DriveCommand,
}

#[derive(Subcommand)]
enum DriveCommand {
    /// List the PDFs in the folder, newest first
    List,

    /// Download one report and analyze it
    Analyze(DriveAnalyzeArgs),

    /// Download one report to disk
    Download {
        /// File id as shown by `resumo drive list`
        file_id: String,

        /// Destination path (default: the file id with a .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct DriveAnalyzeArgs {
    /// File id as shown by `resumo drive list`
    file_id: String,

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

pub async fn run(args: DriveArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;
    let client = GoogleDriveClient::from_config(
        &config.drive,
        EnvTokenProvider::new(&config.drive.token_env),
    );

    match args.command {
        DriveCommand::List => {
            let folder = folder_id(args.folder.as_deref(), &config)?;
            list(&client, &folder).await
        }
        DriveCommand::Analyze(analyze_args) => {
            let folder = folder_id(args.folder.as_deref(), &config)?;
            analyze(&client, &folder, analyze_args, &config).await
        }
        DriveCommand::Download { file_id, output } => download(&client, &file_id, output).await,
    }
}

fn folder_id(flag: Option<&str>, config: &ResumoConfig) -> anyhow::Result<String> {
    flag.map(str::to_string)
        .or_else(|| config.drive.folder_id.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No drive folder configured. Pass --folder or run 'resumo config set drive.folder_id <ID>'."
            )
        })
}

async fn list(client: &GoogleDriveClient<EnvTokenProvider>, folder: &str) -> anyhow::Result<()> {
    let reports = client.list_files(folder).await?;

    if reports.is_empty() {
        println!("{} No PDF files in folder {}", style("ℹ").blue(), folder);
        return Ok(());
    }

    println!("{:<36} {:<12} {:>10}  NAME", "ID", "MODIFIED", "SIZE");
    for report in &reports {
        let modified = report
            .modified
            .map(|m| m.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<36} {:<12} {:>10}  {}",
            report.id,
            modified,
            report.display_size(),
            report.name
        );
    }

    println!();
    println!("{} {} reports", style("✓").green(), reports.len());
    Ok(())
}

async fn analyze(
    client: &GoogleDriveClient<EnvTokenProvider>,
    folder: &str,
    args: DriveAnalyzeArgs,
    config: &ResumoConfig,
) -> anyhow::Result<()> {
    let mut session = Session::new();
    session.set_reports(client.list_files(folder).await?);
    let selection = session.select(&args.file_id)?;

    let pb = spinner();
    pb.set_message("Downloading report...");
    let data = match client.download_file(&args.file_id).await {
        Ok(data) => data,
        Err(e) => {
            pb.abandon_with_message("Download failed");
            session.fail(&selection);
            return Err(e.into());
        }
    };

    pb.set_message("Extracting RESUMO FINAL...");
    let result = match extract_document(&data, config, &args.extraction).await {
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
    info!("Analyzed {} ({} products)", report.name, report.products().len());

    let catalog = load_catalog(config)?;
    let inclusion = Inclusion::excluding(report.products(), args.exclude.iter().map(String::as_str));
    let metrics = aggregate(report.products(), &inclusion, &catalog);

    let analysis = Analysis {
        report,
        method: Some(method),
        metrics: &metrics,
        catalog: &catalog,
    };
    let rendered = output::render(&analysis, args.format)?;
    output::write(&rendered, args.output.as_deref())
}

async fn download(
    client: &GoogleDriveClient<EnvTokenProvider>,
    file_id: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output_path = output.unwrap_or_else(|| PathBuf::from(format!("{}.pdf", file_id)));

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
            .unwrap()
            .progress_chars("=>-"),
    );

    let progress = |downloaded: u64, total: Option<u64>| {
        if let Some(total) = total {
            pb.set_length(total);
        }
        pb.set_position(downloaded);
    };
    let data = client.download_with_progress(file_id, &progress).await?;
    pb.finish_and_clear();

    fs::write(&output_path, &data)?;
    println!(
        "{} Downloaded {} bytes to {}",
        style("✓").green(),
        data.len(),
        output_path.display()
    );
    Ok(())
}
