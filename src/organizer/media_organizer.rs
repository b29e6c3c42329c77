//! # Media Organizer Main Orchestrator
//!
//! Orchestratore principale: esegue un batch dall'inizio alla fine.
//! Ogni fase termina per tutti i file prima che parta la successiva:
//!
//! 1. crea la cartella di output
//! 2. visita l'albero di input
//! 3. legge i metadati e calcola il nome candidato
//! 4. rende unici tutti i nomi
//! 5. copia o converte (passaggio 1)
//! 6. ridimensiona i JPEG (passaggio 2, opzionale)
//!
//! Solo gli errori di scansione e di setup interrompono l'esecuzione. Tutto il
//! resto finisce nel `BatchSummary` restituito e si passa al file successivo.

use crate::{
    config::Config,
    error::OrganizeError,
    json_output::JsonMessage,
    organizer::{
        path_resolver::resolve_names,
        progress_tracker::{BatchSummary, FailureStage},
        transfer::{TransferEngine, TransferOutcome},
    },
    progress::ProgressReporter,
    record::{FileRecord, FileState},
    resize::ResizeOutcome,
    tool_resolver::ToolPathResolver,
    walker::{DiscoveredFile, TreeWalker},
};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Batch driver
pub struct MediaOrganizer {
    config: Config,
    engine: TransferEngine,
}

impl MediaOrganizer {
    /// Validate the configuration and look up converters on `PATH`
    pub fn new(config: Config) -> Result<Self> {
        Self::with_tools(config, ToolPathResolver::new())
    }

    /// Same as `new` with an explicit tool resolver
    pub fn with_tools(config: Config, tools: ToolPathResolver) -> Result<Self> {
        config.validate()?;
        let engine = TransferEngine::new(&config, tools);
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole batch.
    pub async fn run(&self, progress: &mut dyn ProgressReporter) -> Result<BatchSummary> {
        let start_time = Instant::now();
        let mut summary = BatchSummary::new();

        if !self.config.dry_run {
            tokio::fs::create_dir_all(&self.config.output_dir)
                .await
                .with_context(|| format!("Failed to create output directory {}", self.config.output_dir.display()))?;
        }

        let input_root = self.config.input_dir.clone();
        let nested_output = self.config.nested_output_dir();
        let discovered = TreeWalker::walk_excluding(&input_root, nested_output.as_deref())?;
        summary.found = discovered.len();

        self.emit_start_message(discovered.len());
        self.log_configuration(discovered.len());

        let mut records = self.create_records(discovered, &input_root, &mut summary).await;

        let mut seen: HashSet<PathBuf> = HashSet::new();
        resolve_names(&mut records, &mut seen);

        if self.config.dry_run {
            self.plan_only(&records, progress);
        } else {
            progress.start(records.len() as u64 * self.config.passes());
            self.transfer_pass(&mut records, &mut seen, &mut summary, progress).await;
            if self.config.resize {
                self.resize_pass(&mut records, &mut summary, progress).await;
            }
            progress.stop();

            for record in records.iter_mut().filter(|r| !r.is_failed()) {
                record.state = FileState::Done;
            }
        }

        self.print_final_stats(&summary, start_time.elapsed().as_secs_f64());
        Ok(summary)
    }

    /// Stat every discovered file; unreadable ones become failures.
    async fn create_records(
        &self,
        discovered: Vec<DiscoveredFile>,
        input_root: &Path,
        summary: &mut BatchSummary,
    ) -> Vec<FileRecord> {
        let mut records = Vec::with_capacity(discovered.len());
        for file in discovered {
            let source = file.source_path.clone();
            match FileRecord::create(file, input_root, &self.config.output_dir).await {
                Ok(record) => records.push(record),
                Err(e) => self.record_failure(summary, &source, FailureStage::Stat, &e),
            }
        }
        records
    }

    async fn transfer_pass(
        &self,
        records: &mut [FileRecord],
        seen: &mut HashSet<PathBuf>,
        summary: &mut BatchSummary,
        progress: &mut dyn ProgressReporter,
    ) {
        info!("📁 Copying {} files to {}", records.len(), self.config.output_dir.display());

        for record in records.iter_mut() {
            progress.set_message(&record.display_name());
            match self.engine.transfer(record, seen).await {
                Ok(TransferOutcome::Copied) => summary.add_copied(),
                Ok(TransferOutcome::Converted) => summary.add_converted(),
                Err(e) => {
                    let stage = match &e {
                        OrganizeError::Transfer { .. } => FailureStage::Copy,
                        _ => FailureStage::Convert,
                    };
                    self.record_failure(summary, &record.source_path, stage, &e);
                }
            }
            progress.increment();
        }
    }

    async fn resize_pass(
        &self,
        records: &mut [FileRecord],
        summary: &mut BatchSummary,
        progress: &mut dyn ProgressReporter,
    ) {
        info!("🖼️ Resizing JPEG files to {}px wide", self.config.resize_width);

        for record in records.iter_mut() {
            progress.set_message(&record.display_name());
            match self.engine.resize(record).await {
                Ok(Some(ResizeOutcome::Resized { .. })) => summary.add_resized(),
                Ok(Some(ResizeOutcome::Unchanged { .. })) => summary.add_resize_skipped(),
                Ok(None) => {}
                Err(e) => self.record_failure(summary, &record.source_path, FailureStage::Resize, &e),
            }
            progress.increment();
        }
    }

    /// Dry run: report the planned mapping, touch nothing.
    fn plan_only(&self, records: &[FileRecord], progress: &mut dyn ProgressReporter) {
        progress.start(records.len() as u64);
        for record in records {
            info!(
                "[dry run] {} -> {}",
                record.source_path.display(),
                record.target_path.display()
            );
            progress.increment();
        }
        progress.stop();
    }

    fn record_failure(&self, summary: &mut BatchSummary, source: &Path, stage: FailureStage, error: &OrganizeError) {
        warn!("Failed to process {} ({:?}): {}", source.display(), stage, error);
        if self.config.json_output {
            JsonMessage::FileFailed {
                path: source.to_path_buf(),
                stage,
                error: error.to_string(),
            }
            .emit();
        }
        summary.add_failure(source, stage, error.to_string());
    }

    fn emit_start_message(&self, total_files: usize) {
        if self.config.json_output {
            JsonMessage::Start {
                input_dir: self.config.input_dir.clone(),
                output_dir: self.config.output_dir.clone(),
                total_files,
                resize: self.config.resize,
                dry_run: self.config.dry_run,
            }
            .emit();
        } else {
            info!("Starting media organization in: {}", self.config.input_dir.display());
        }
    }

    fn log_configuration(&self, total_files: usize) {
        if self.config.json_output {
            return;
        }

        info!("Output directory: {}", self.config.output_dir.display());
        if self.config.resize {
            info!(
                "Resize: {}px wide (JPEG quality: {})",
                self.config.resize_width, self.config.jpeg_quality
            );
        }
        if self.config.dry_run {
            info!("Dry run mode: No files will be written");
        }
        info!("Found {} files to organize", total_files);
    }

    fn print_final_stats(&self, summary: &BatchSummary, duration_seconds: f64) {
        if self.config.json_output {
            JsonMessage::complete(summary, duration_seconds).emit();
            return;
        }

        info!("✅ {}", summary.format_summary());
        info!("{} files written to {}", summary.delivered(), self.config.output_dir.display());
        if summary.resize_skipped > 0 {
            debug!("{} images were already narrow enough", summary.resize_skipped);
        }
        info!("Done in {:.1}s", duration_seconds);
    }
}
