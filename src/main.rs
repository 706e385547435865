// Entry point of the image-compressor CLI.
// The library (lib.rs) holds the pipeline; this file only wires it to the terminal.

use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use image_compressor_lib::{
    CompressorConfig, CompressorError, OutcomeSummary, Orchestrator, Quality,
    compress_paths, save_downloads,
};

#[derive(Parser)]
#[command(name = "image-compressor")]
#[command(version, about = "Recompress up to five images as JPEG at an adjustable quality", long_about = None)]
struct Cli {
    /// Images to compress; non-images are skipped and only the first five are kept
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Quality between 0.10 and 1.00, snapped to steps of 0.05
    #[arg(short, long)]
    quality: Option<f32>,

    /// Directory the compressed files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,

    /// Compress and report without writing any file
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_target(false)       // Remove module path
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_summary(summary: &OutcomeSummary) {
    match (&summary.download_name, summary.compressed_size) {
        (Some(download_name), Some(size)) => {
            let saved_kb = summary.saved_bytes.unwrap_or(0) as f64 / 1024.0;
            println!(
                "{} → {} ({:.2} KB, {saved_kb:.2} KB saved / {:.0}% compression)",
                summary.file_name,
                download_name,
                size as f64 / 1024.0,
                summary.compression_ratio.unwrap_or(0.0),
            );
        }
        _ => println!(
            "{} ✗ {}",
            summary.file_name,
            summary.error.as_deref().unwrap_or("failed"),
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CompressorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CompressorConfig::default(),
    };
    let quality = cli
        .quality
        .map(Quality::from_slider)
        .unwrap_or(config.default_quality);
    debug!("Using quality {}", quality);

    let orchestrator = Orchestrator::new(&config);
    let summaries = match compress_paths(&orchestrator, &cli.files, quality).await {
        Ok(summaries) => summaries,
        Err(CompressorError::NoImagesSelected) => {
            anyhow::bail!("none of the {} selected files is an image", cli.files.len());
        }
        Err(e) => return Err(e).context("compressing files"),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        summaries.iter().for_each(print_summary);
    }

    let failed = summaries.iter().filter(|s| !s.success).count();
    if failed > 0 {
        warn!("{} of {} files could not be compressed", failed, summaries.len());
    }

    if cli.dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let written = save_downloads(&orchestrator, &cli.output_dir)
        .await
        .with_context(|| format!("writing to {}", cli.output_dir.display()))?;
    info!("Wrote {} files to {}", written.len(), cli.output_dir.display());
    Ok(())
}
