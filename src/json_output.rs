//! # JSON Output Module
//!
//! Questo modulo gestisce l'output JSON su stdout, una riga per evento,
//! per chi pilota l'organizer da un altro programma (`--json`).
//!
//! ## Tipi di messaggio:
//! - `start`: file trovati, dopo la scansione
//! - `file_failed`: un file non è stato copiato, convertito, ridimensionato o letto
//! - `complete`: conteggi finali

use crate::organizer::progress_tracker::{BatchSummary, FailureStage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// JSON message type
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        resize: bool,
        dry_run: bool,
    },

    #[serde(rename = "file_failed")]
    FileFailed {
        path: PathBuf,
        stage: FailureStage,
        error: String,
    },

    #[serde(rename = "complete")]
    Complete {
        found: usize,
        copied: usize,
        converted: usize,
        resized: usize,
        failed: usize,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    /// Print the message as one JSON line on stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn complete(summary: &BatchSummary, duration_seconds: f64) -> Self {
        JsonMessage::Complete {
            found: summary.found,
            copied: summary.copied,
            converted: summary.converted,
            resized: summary.resized,
            failed: summary.failed,
            duration_seconds,
        }
    }
}
