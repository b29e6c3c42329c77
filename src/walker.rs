//! # Tree Walker Module
//!
//! Questo modulo gestisce la scansione ricorsiva dei file da organizzare.
//!
//! ## Responsabilità:
//! - Visita depth-first della radice di input, nell'ordine di listing delle directory
//! - Classificazione di ogni voce: directory da visitare, file da saltare o file da processare
//! - Errore fatale se una directory non è leggibile
//! - Esclusione della cartella di output quando sta dentro l'input
//!
//! ## Liste di esclusione:
//! - **Nomi**: file di sistema (`.DS_Store`, `Icon`, `Thumbs.db`, `desktop.ini`)
//! - **Estensioni**: formati raw delle fotocamere e file sidecar/database
//!
//! I file senza estensione vengono saltati di proposito: decide il tipo reale
//! della voce, quindi un `README` viene ignorato invece di essere trattato
//! come una cartella.
//!
//! I metadati si leggono dopo, in `record.rs`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = TreeWalker::walk(Path::new("/photos/Wedding"))?;
//! for file in &files {
//!     println!("{} (in {})", file.source_path.display(), file.source_dir.display());
//! }
//! ```

use crate::error::OrganizeError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// File names that are never processed, wherever they appear
pub const SKIP_NAMES: &[&str] = &[".DS_Store", "Icon", "Thumbs.db", "desktop.ini"];

/// Extensions (lowercase, no dot) that are never processed
pub const SKIP_EXTENSIONS: &[&str] = &[
    // camera raw
    "cr2", "cr3", "nef", "arw", "dng", "raf", "orf", "rw2", "raw",
    // sidecars and databases
    "db", "xmp", "aae", "thm",
];

/// A file found by the walker, before any metadata is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub source_path: PathBuf,
    pub source_dir: PathBuf,
}

/// What the walker does with a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Skipped,
    File,
}

/// Classify an entry by its (trimmed) name and whether it is a directory.
pub fn classify_entry(name: &OsStr, is_dir: bool) -> EntryKind {
    let name = name.to_string_lossy();
    let name = name.trim();

    if SKIP_NAMES.contains(&name) {
        return EntryKind::Skipped;
    }
    if is_dir {
        return EntryKind::Directory;
    }

    match Path::new(name).extension() {
        None => EntryKind::Skipped,
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            if SKIP_EXTENSIONS.contains(&ext.as_str()) {
                EntryKind::Skipped
            } else {
                EntryKind::File
            }
        }
    }
}

/// Walks the input tree
pub struct TreeWalker;

impl TreeWalker {
    /// Collect every processable file under `root`, depth-first in listing order.
    pub fn walk(root: &Path) -> Result<Vec<DiscoveredFile>, OrganizeError> {
        Self::walk_excluding(root, None)
    }

    /// Same as `walk`, without descending into `excluded`.
    ///
    /// `excluded` must be in canonical form (see `config::normalize_path`); it is
    /// the output directory when that sits inside the input tree.
    pub fn walk_excluding(root: &Path, excluded: Option<&Path>) -> Result<Vec<DiscoveredFile>, OrganizeError> {
        let mut files = Vec::new();
        let mut entries = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry, excluded));

        while let Some(entry) = entries.next() {
            let entry = entry.map_err(|source| OrganizeError::Traversal {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                source,
            })?;

            let is_dir = entry.file_type().is_dir();
            match classify_entry(entry.file_name(), is_dir) {
                EntryKind::Directory => {}
                EntryKind::Skipped => {
                    debug!("Skipping {}", entry.path().display());
                    if is_dir {
                        entries.skip_current_dir();
                    }
                }
                EntryKind::File => {
                    let source_path = entry.into_path();
                    let source_dir = source_path
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    files.push(DiscoveredFile {
                        source_path,
                        source_dir,
                    });
                }
            }
        }

        Ok(files)
    }
}

fn is_excluded(entry: &DirEntry, excluded: Option<&Path>) -> bool {
    let Some(excluded) = excluded else {
        return false;
    };
    if !entry.file_type().is_dir() {
        return false;
    }
    let skip = entry
        .path()
        .canonicalize()
        .map(|path| path == excluded)
        .unwrap_or(false);
    if skip {
        debug!("Not descending into output directory {}", entry.path().display());
    }
    skip
}
