//! # Media Organizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory di input, output, resize, quality, ...)
//! 2. Configura il logging (INFO o DEBUG con `--verbose`, `RUST_LOG` ha la precedenza)
//! 3. Crea un oggetto Config e avvia MediaOrganizer
//! 4. Stampa i file che hanno dato problemi
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-organizer ~/Pictures/Wedding --output ~/Wedding-flat --resize --width 2048
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use media_organizer::{config::DEFAULT_OUTPUT_DIR, Config, MediaOrganizer, NoProgress, ProgressManager, ProgressReporter};

#[derive(Parser)]
#[command(name = "media-organizer")]
#[command(about = "Flatten a photo/video tree into one folder of timestamp-named files")]
struct Args {
    /// Directory tree containing the media files
    input_directory: PathBuf,

    /// Flat output directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Downsample JPEG outputs wider than --width
    #[arg(short, long)]
    resize: bool,

    /// Target width in pixels for --resize
    #[arg(short, long, default_value = "1920")]
    width: u32,

    /// JPEG quality for HEIC conversion and resizing (1-100)
    #[arg(short, long, default_value = "90")]
    quality: u8,

    /// Only print the planned names, don't write anything
    #[arg(long)]
    dry_run: bool,

    /// Output progress and results as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config {
        input_dir: args.input_directory,
        output_dir: args.output,
        resize: args.resize,
        resize_width: args.width,
        jpeg_quality: args.quality,
        dry_run: args.dry_run,
        json_output: args.json,
    };

    let mut progress: Box<dyn ProgressReporter> = if config.json_output {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressManager::new())
    };

    let organizer = MediaOrganizer::new(config)?;
    let summary = organizer.run(progress.as_mut()).await?;

    if !organizer.config().json_output && !summary.failures.is_empty() {
        eprintln!("\n{} file(s) had problems:", summary.failures.len());
        for failure in &summary.failures {
            eprintln!("  {} [{:?}]: {}", failure.source.display(), failure.stage, failure.message);
        }
    }

    Ok(())
}
