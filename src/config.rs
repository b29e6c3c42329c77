//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione di una esecuzione.
//! Non esiste un file di configurazione: `main.rs` riempie `Config` dagli
//! argomenti della command line e l'organizer lo valida prima di toccare il filesystem.
//!
//! ## Parametri:
//! - `input_dir`: Radice dell'albero da appiattire
//! - `output_dir`: Cartella piatta di destinazione (default: `./output`)
//! - `resize`: Abilita il secondo passaggio di ridimensionamento (default: false)
//! - `resize_width`: Larghezza target in pixel (default: 1920)
//! - `jpeg_quality`: Qualità per conversione HEIC e ricodifica (1-100, default: 90)
//! - `dry_run`: Calcola i nomi senza scrivere nulla (default: false)
//! - `json_output`: Eventi JSON su stdout (default: false)
//!
//! Se `output_dir` sta dentro `input_dir` viene esclusa dalla scansione,
//! altrimenti ogni esecuzione rileggerebbe i file prodotti da quella precedente.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     input_dir: PathBuf::from("/photos/wedding"),
//!     resize: true,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OrganizeError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Configuration for a single organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory to walk
    pub input_dir: PathBuf,
    /// Flat output directory (created when missing)
    pub output_dir: PathBuf,
    /// Run the resize pass after copying
    pub resize: bool,
    /// Target width for the resize pass
    pub resize_width: u32,
    /// JPEG quality for conversion and resize (1-100)
    pub jpeg_quality: u8,
    /// Dry run - resolve names but don't write files
    pub dry_run: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            resize: false,
            resize_width: 1920,
            jpeg_quality: 90,
            dry_run: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(OrganizeError::Validation("JPEG quality must be between 1 and 100".to_string()).into());
        }

        if self.resize && self.resize_width == 0 {
            return Err(OrganizeError::Validation("Resize width must be greater than 0".to_string()).into());
        }

        if !self.input_dir.exists() {
            return Err(OrganizeError::Validation(format!("Input directory does not exist: {}", self.input_dir.display())).into());
        }
        if !self.input_dir.is_dir() {
            return Err(OrganizeError::Validation(format!("Input path is not a directory: {}", self.input_dir.display())).into());
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(OrganizeError::Validation(format!("Output path is not a directory: {}", self.output_dir.display())).into());
        }

        if normalize_path(&self.output_dir) == normalize_path(&self.input_dir) {
            return Err(OrganizeError::Validation("Output directory must differ from the input directory".to_string()).into());
        }

        Ok(())
    }

    /// Output directory when it lies inside the input tree, so the walk can leave it out
    pub fn nested_output_dir(&self) -> Option<PathBuf> {
        let input = normalize_path(&self.input_dir);
        let output = normalize_path(&self.output_dir);
        output.starts_with(&input).then_some(output)
    }

    /// Number of progress units each file contributes
    pub fn passes(&self) -> u64 {
        if self.resize {
            2
        } else {
            1
        }
    }
}

/// Absolute, symlink-free form of `path`.
///
/// Components that do not exist yet are appended to the canonical form of the
/// closest existing ancestor, so `./out` and `out` compare equal before `out`
/// is created.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => normalize_path(parent).join(name),
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}
