//! # File Record Module
//!
//! Un `FileRecord` segue un file scoperto per tutto il batch:
//!
//! ```text
//! Discovered → Resolved → Transferred → (Resized) → Done
//!                 └──────────┴──────────────┴────→ Failed
//! ```
//!
//! I record vengono creati dopo la scansione: un file con metadati illeggibili
//! fallisce da solo senza interrompere la visita delle directory.

use crate::error::OrganizeError;
use crate::naming::{candidate_file_name, format_group_name, path_extension};
use crate::walker::DiscoveredFile;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

/// Processing state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Discovered,
    Resolved,
    Transferred,
    Resized,
    Done,
    Failed,
}

/// A file on its way into the output directory
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub source_path: PathBuf,
    pub source_dir: PathBuf,
    pub created: DateTime<Local>,
    pub target_path: PathBuf,
    pub state: FileState,
}

impl FileRecord {
    /// Stat the discovered file and compute its candidate target path.
    pub async fn create(
        discovered: DiscoveredFile,
        input_root: &Path,
        output_dir: &Path,
    ) -> Result<Self, OrganizeError> {
        let metadata = fs::metadata(&discovered.source_path)
            .await
            .map_err(|source| OrganizeError::Stat {
                path: discovered.source_path.clone(),
                source,
            })?;

        let created = birthtime(&metadata).map_err(|source| OrganizeError::Stat {
            path: discovered.source_path.clone(),
            source,
        })?;

        Ok(Self::with_timestamp(discovered, created, input_root, output_dir))
    }

    /// Build a record from an already known creation time
    pub fn with_timestamp(
        discovered: DiscoveredFile,
        created: DateTime<Local>,
        input_root: &Path,
        output_dir: &Path,
    ) -> Self {
        let group = format_group_name(&discovered.source_dir, input_root);
        let extension = path_extension(&discovered.source_path);
        let target_path = output_dir.join(candidate_file_name(&created, &group, &extension));

        Self {
            source_path: discovered.source_path,
            source_dir: discovered.source_dir,
            created,
            target_path,
            state: FileState::Discovered,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.state == FileState::Failed
    }

    /// Source file name for log lines
    pub fn display_name(&self) -> String {
        self.source_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// Creation time of a file in local time.
///
/// Filesystems that cannot report a birth time fall back to the modification time.
fn birthtime(metadata: &std::fs::Metadata) -> std::io::Result<DateTime<Local>> {
    let time: SystemTime = match metadata.created() {
        Ok(time) => time,
        Err(e) if e.kind() == std::io::ErrorKind::Unsupported => {
            debug!("Birth time unsupported, using modification time: {}", e);
            metadata.modified()?
        }
        Err(e) => return Err(e),
    };
    Ok(DateTime::<Local>::from(time))
}
