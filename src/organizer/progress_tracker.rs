//! # Progress Tracking Module
//!
//! Raccoglie gli esiti dei singoli file nel riepilogo di fine esecuzione.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Step at which a file failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Stat,
    Copy,
    Convert,
    Resize,
}

/// One failed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub source: PathBuf,
    pub stage: FailureStage,
    pub message: String,
}

/// Aggregate counts of a finished batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub found: usize,
    pub copied: usize,
    pub converted: usize,
    pub resized: usize,
    pub resize_skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailedFile>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_copied(&mut self) {
        self.copied += 1;
    }

    pub fn add_converted(&mut self) {
        self.converted += 1;
    }

    pub fn add_resized(&mut self) {
        self.resized += 1;
    }

    pub fn add_resize_skipped(&mut self) {
        self.resize_skipped += 1;
    }

    /// Record a failure. A file that fails at resize was already counted as
    /// copied or converted, so it is listed but not counted twice in `failed`.
    pub fn add_failure(&mut self, source: &Path, stage: FailureStage, message: String) {
        if stage != FailureStage::Resize {
            self.failed += 1;
        }
        self.failures.push(FailedFile {
            source: source.to_path_buf(),
            stage,
            message,
        });
    }

    /// Files that made it into the output directory
    pub fn delivered(&self) -> usize {
        self.copied + self.converted
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Found: {} | Copied: {} | Converted: {} | Resized: {} | Failed: {}",
            self.found, self.copied, self.converted, self.resized, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_failure_is_listed_but_not_counted_as_failed_file() {
        let mut summary = BatchSummary::new();
        summary.found = 2;
        summary.add_copied();
        summary.add_failure(Path::new("/in/a.jpg"), FailureStage::Resize, "decode".into());
        summary.add_failure(Path::new("/in/b.jpg"), FailureStage::Copy, "denied".into());

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(summary.delivered(), 1);
    }

    #[test]
    fn test_summary_serializes_stage_in_snake_case() {
        let mut summary = BatchSummary::new();
        summary.add_failure(Path::new("/in/a.heic"), FailureStage::Convert, "no tool".into());

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"stage\":\"convert\""));
    }

    #[test]
    fn test_format_summary() {
        let mut summary = BatchSummary::new();
        summary.found = 3;
        summary.add_copied();
        summary.add_converted();
        summary.add_resized();
        assert_eq!(
            summary.format_summary(),
            "Found: 3 | Copied: 1 | Converted: 1 | Resized: 1 | Failed: 0"
        );
    }
}
