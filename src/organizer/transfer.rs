//! # Transfer Module
//!
//! Worker per i singoli record: copia o conversione nella cartella di output
//! (passaggio 1), poi eventuale ridimensionamento (passaggio 2). Ogni errore
//! torna al chiamante, che lo registra e passa al file successivo.

use crate::{
    config::Config,
    error::OrganizeError,
    image_processor::HeicConverter,
    naming::{is_heic, JPEG_EXTENSION},
    organizer::path_resolver::claim_unique,
    record::{FileRecord, FileState},
    resize::{is_resizable, ImageResizer, ResizeOutcome},
    tool_resolver::ToolPathResolver,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// What pass 1 did with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Copied,
    Converted,
}

/// Performs copy, conversion and resize for single records
pub struct TransferEngine {
    converter: HeicConverter,
    resizer: ImageResizer,
}

impl TransferEngine {
    pub fn new(config: &Config, tools: ToolPathResolver) -> Self {
        Self {
            converter: HeicConverter::new(tools, config.jpeg_quality),
            resizer: ImageResizer::new(config.resize_width, config.jpeg_quality),
        }
    }

    /// Pass 1: copy the record, or convert it when it is a HEIC photo.
    ///
    /// A HEIC record's target is switched to `.jpg` and claimed again in `seen`
    /// so the rewritten name stays unique within the batch.
    pub async fn transfer(
        &self,
        record: &mut FileRecord,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<TransferOutcome, OrganizeError> {
        let result = if is_heic(&record.source_path) {
            record.target_path = converted_target(&record.target_path, seen);
            self.converter
                .convert_to_jpeg(&record.source_path, &record.target_path)
                .await
                .map(|_| TransferOutcome::Converted)
        } else {
            copy_file(&record.source_path, &record.target_path)
                .await
                .map(|_| TransferOutcome::Copied)
        };

        record.state = match result {
            Ok(_) => FileState::Transferred,
            Err(_) => FileState::Failed,
        };
        if let Ok(outcome) = &result {
            debug!(
                "{:?} {} -> {}",
                outcome,
                record.source_path.display(),
                record.target_path.display()
            );
        }
        result
    }

    /// Pass 2: downsample a transferred JPEG in place.
    ///
    /// Returns `Ok(None)` for records the pass does not apply to.
    pub async fn resize(&self, record: &mut FileRecord) -> Result<Option<ResizeOutcome>, OrganizeError> {
        if record.state != FileState::Transferred || !is_resizable(&record.target_path) {
            return Ok(None);
        }

        match self.resizer.resize_in_place(&record.target_path).await {
            Ok(outcome) => {
                if let ResizeOutcome::Resized { .. } = outcome {
                    record.state = FileState::Resized;
                }
                Ok(Some(outcome))
            }
            Err(e) => {
                record.state = FileState::Failed;
                Err(e)
            }
        }
    }
}

/// Target path after conversion to JPEG, claimed in `seen`
pub fn converted_target(target: &Path, seen: &mut HashSet<PathBuf>) -> PathBuf {
    let jpeg = target.with_extension(JPEG_EXTENSION.trim_start_matches('.'));
    claim_unique(&jpeg, seen)
}

/// Byte copy that removes a partially written target on failure.
///
/// A file that was already at `to` before the copy is never removed.
async fn copy_file(from: &Path, to: &Path) -> Result<(), OrganizeError> {
    let target_existed = fs::try_exists(to).await.unwrap_or(true);

    match fs::copy(from, to).await {
        Ok(_) => Ok(()),
        Err(source) => {
            if !target_existed && fs::try_exists(to).await.unwrap_or(false) {
                let _ = fs::remove_file(to).await;
            }
            Err(OrganizeError::Transfer {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::DiscoveredFile;
    use chrono::{Local, TimeZone};
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn engine(resize_width: u32) -> TransferEngine {
        let config = Config {
            resize: true,
            resize_width,
            ..Default::default()
        };
        TransferEngine::new(&config, ToolPathResolver::with_search_path(Vec::new()))
    }

    fn resolved(source: PathBuf, output: &Path) -> FileRecord {
        let root = source.parent().unwrap().to_path_buf();
        let mut record = FileRecord::with_timestamp(
            DiscoveredFile {
                source_path: source,
                source_dir: root.clone(),
            },
            Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            &root,
            output,
        );
        record.state = FileState::Resolved;
        record
    }

    #[test]
    fn test_heic_target_becomes_jpg_and_stays_unique() {
        let mut seen = HashSet::new();
        seen.insert(PathBuf::from("/out/2024-05-01-10-00-00-000.heic"));
        seen.insert(PathBuf::from("/out/2024-05-01-10-00-00-000.jpg"));

        let target = converted_target(Path::new("/out/2024-05-01-10-00-00-000.heic"), &mut seen);
        assert_eq!(target, PathBuf::from("/out/2024-05-01-10-00-00-000-02.jpg"));
    }

    #[tokio::test]
    async fn test_copy_writes_identical_bytes() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = input.path().join("clip.MOV");
        std::fs::write(&source, b"movie bytes").unwrap();

        let mut record = resolved(source, output.path());
        let mut seen = HashSet::new();
        let outcome = engine(200).transfer(&mut record, &mut seen).await.unwrap();

        assert_eq!(outcome, TransferOutcome::Copied);
        assert_eq!(record.state, FileState::Transferred);
        assert!(record.target_path.to_string_lossy().ends_with(".mov"));
        assert_eq!(std::fs::read(&record.target_path).unwrap(), b"movie bytes");
    }

    #[tokio::test]
    async fn test_missing_source_fails_the_record() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let mut record = resolved(input.path().join("gone.jpg"), output.path());
        let mut seen = HashSet::new();
        let err = engine(200).transfer(&mut record, &mut seen).await.unwrap_err();

        assert!(matches!(err, OrganizeError::Transfer { .. }));
        assert!(record.is_failed());
        assert!(!record.target_path.exists());
    }

    #[tokio::test]
    async fn test_failed_copy_keeps_file_already_in_output() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = input.path().join("album.jpg");
        std::fs::create_dir(&source).unwrap();

        let mut record = resolved(source, output.path());
        std::fs::write(&record.target_path, b"from an earlier run").unwrap();

        let mut seen = HashSet::new();
        let err = engine(200).transfer(&mut record, &mut seen).await.unwrap_err();

        assert!(matches!(err, OrganizeError::Transfer { .. }));
        assert_eq!(std::fs::read(&record.target_path).unwrap(), b"from an earlier run");
    }

    #[tokio::test]
    async fn test_heic_without_converter_fails_with_jpg_target() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = input.path().join("IMG_1.HEIC");
        std::fs::write(&source, b"heic bytes").unwrap();

        let mut record = resolved(source, output.path());
        let mut seen = HashSet::new();
        seen.insert(record.target_path.clone());
        let result = engine(200).transfer(&mut record, &mut seen).await;

        assert!(matches!(result, Err(OrganizeError::MissingDependency(_))));
        assert!(record.target_path.to_string_lossy().ends_with(".jpg"));
        assert!(record.is_failed());
    }

    #[tokio::test]
    async fn test_resize_applies_only_to_transferred_jpegs() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let photo = input.path().join("photo.jpeg");
        RgbImage::from_pixel(300, 100, Rgb([10, 20, 30])).save_with_format(&photo, image::ImageFormat::Jpeg).unwrap();
        let png = input.path().join("drawing.png");
        RgbImage::from_pixel(300, 100, Rgb([10, 20, 30])).save(&png).unwrap();

        let engine = engine(150);
        let mut seen = HashSet::new();

        let mut jpeg_record = resolved(photo, output.path());
        engine.transfer(&mut jpeg_record, &mut seen).await.unwrap();
        let outcome = engine.resize(&mut jpeg_record).await.unwrap();
        assert_eq!(
            outcome,
            Some(ResizeOutcome::Resized {
                from: (300, 100),
                to: (150, 50)
            })
        );
        assert_eq!(jpeg_record.state, FileState::Resized);

        let mut png_record = resolved(png, output.path());
        engine.transfer(&mut png_record, &mut seen).await.unwrap();
        assert_eq!(engine.resize(&mut png_record).await.unwrap(), None);
        assert_eq!(png_record.state, FileState::Transferred);
    }
}
