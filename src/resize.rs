//! # Image Resize Module
//!
//! Questo modulo ridimensiona in place i JPEG di output a una larghezza fissa.
//!
//! ## Comportamento
//! - **Solo larghezza**: l'altezza segue dal rapporto d'aspetto, arrotondata, minimo 1px
//! - **Mai upscaling**: le immagini già strette restano identiche byte per byte
//! - **Sovrascrittura atomica**: il JPEG ricodificato va in un file temporaneo
//!   accanto al target e poi lo rimpiazza, un resize fallito lascia la copia intatta
//! - **EXIF conservati**: il segmento APP1 dell'originale (Orientation, data di
//!   scatto) viene reinserito nel nuovo file
//! - Filtro **Lanczos3**, qualità JPEG dalla configurazione
//!
//! Decodifica e codifica girano sul blocking pool; il chiamante attende ogni
//! file prima di passare al successivo.

use crate::error::OrganizeError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Identifier that opens an EXIF APP1 segment
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Result of resizing one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Resized { from: (u32, u32), to: (u32, u32) },
    Unchanged { width: u32 },
}

/// Proportional in-place JPEG resizer
#[derive(Debug, Clone)]
pub struct ImageResizer {
    target_width: u32,
    jpeg_quality: u8,
}

impl ImageResizer {
    pub fn new(target_width: u32, jpeg_quality: u8) -> Self {
        Self {
            target_width,
            jpeg_quality,
        }
    }

    /// New dimensions for an image, or `None` when it is not wider than the target
    pub fn target_dimensions(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width <= self.target_width {
            return None;
        }
        let scaled = (height as u64 * self.target_width as u64 + width as u64 / 2) / width as u64;
        Some((self.target_width, scaled.max(1) as u32))
    }

    /// Resize the JPEG at `path` and overwrite it.
    pub async fn resize_in_place(&self, path: &Path) -> Result<ResizeOutcome, OrganizeError> {
        let resizer = self.clone();
        let path: PathBuf = path.to_path_buf();

        tokio::task::spawn_blocking(move || resizer.resize_blocking(&path))
            .await
            .map_err(|e| OrganizeError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }

    fn resize_blocking(&self, path: &Path) -> Result<ResizeOutcome, OrganizeError> {
        let image = image::io::Reader::open(path)?.with_guessed_format()?.decode()?;
        let (width, height) = image.dimensions();

        let Some((new_width, new_height)) = self.target_dimensions(width, height) else {
            debug!("{} is {}px wide, not resizing", path.display(), width);
            return Ok(ResizeOutcome::Unchanged { width });
        };

        let resized = image
            .resize_exact(new_width, new_height, FilterType::Lanczos3)
            .to_rgb8();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.jpeg_quality).encode_image(&resized)?;
        if let Some(exif) = read_exif(path) {
            encoded = insert_exif_segment(encoded, &exif);
        }

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(&encoded)?;
        temp.flush()?;
        temp.persist(path).map_err(|e| OrganizeError::Io(e.error))?;

        debug!(
            "Resized {} from {}x{} to {}x{}",
            path.display(),
            width,
            height,
            new_width,
            new_height
        );
        Ok(ResizeOutcome::Resized {
            from: (width, height),
            to: (new_width, new_height),
        })
    }
}

/// Raw EXIF (TIFF) payload of a JPEG, if it has one
fn read_exif(path: &Path) -> Option<Vec<u8>> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    match exif::get_exif_attr_from_jpeg(&mut reader) {
        Ok(data) => Some(data),
        Err(e) => {
            debug!("No EXIF kept for {}: {}", path.display(), e);
            None
        }
    }
}

/// Put an EXIF APP1 segment into an encoded JPEG, right after SOI and JFIF APP0.
///
/// Payloads that do not fit in one segment are dropped.
fn insert_exif_segment(jpeg: Vec<u8>, exif: &[u8]) -> Vec<u8> {
    let segment_len = 2 + EXIF_HEADER.len() + exif.len();
    if jpeg.len() < 4 || jpeg[..2] != [0xFF, 0xD8] || segment_len > u16::MAX as usize {
        return jpeg;
    }

    let mut at = 2;
    if jpeg[2..4] == [0xFF, 0xE0] && jpeg.len() >= 6 {
        at = 4 + u16::from_be_bytes([jpeg[4], jpeg[5]]) as usize;
    }
    if at > jpeg.len() {
        return jpeg;
    }

    let mut out = Vec::with_capacity(jpeg.len() + segment_len + 2);
    out.extend_from_slice(&jpeg[..at]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&(segment_len as u16).to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(exif);
    out.extend_from_slice(&jpeg[at..]);
    out
}

/// Whether a target path is a JPEG the resize pass should look at
pub fn is_resizable(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "jpg")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        image.save(path).unwrap();
    }

    #[test]
    fn test_target_dimensions_keep_aspect_ratio() {
        let resizer = ImageResizer::new(1920, 90);
        assert_eq!(resizer.target_dimensions(4032, 3024), Some((1920, 1440)));
        assert_eq!(resizer.target_dimensions(3000, 1), Some((1920, 1)));
        assert_eq!(resizer.target_dimensions(1920, 1080), None);
        assert_eq!(resizer.target_dimensions(800, 600), None);
    }

    #[tokio::test]
    async fn test_wide_image_is_scaled_to_target_width() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wide.jpg");
        write_jpeg(&path, 400, 300);

        let resizer = ImageResizer::new(200, 90);
        let outcome = resizer.resize_in_place(&path).await.unwrap();

        assert_eq!(
            outcome,
            ResizeOutcome::Resized {
                from: (400, 300),
                to: (200, 150)
            }
        );
        let reopened = image::open(&path).unwrap();
        assert_eq!(reopened.dimensions(), (200, 150));
    }

    #[tokio::test]
    async fn test_narrow_image_is_never_upscaled() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("narrow.jpg");
        write_jpeg(&path, 100, 80);
        let before = std::fs::read(&path).unwrap();

        let resizer = ImageResizer::new(200, 90);
        let outcome = resizer.resize_in_place(&path).await.unwrap();

        assert_eq!(outcome, ResizeOutcome::Unchanged { width: 100 });
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_corrupt_jpeg_fails_and_is_left_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let resizer = ImageResizer::new(200, 90);
        assert!(resizer.resize_in_place(&path).await.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"definitely not a jpeg");
    }

    /// Little-endian TIFF block holding a single Orientation entry
    fn orientation_tiff(orientation: u16) -> Vec<u8> {
        let mut tiff = vec![b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff
    }

    fn orientation_of(path: &Path) -> Option<u32> {
        let mut reader = BufReader::new(File::open(path).unwrap());
        let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
        exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
    }

    #[tokio::test]
    async fn test_exif_orientation_survives_resize() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("portrait.jpg");
        write_jpeg(&path, 400, 200);
        let with_exif = insert_exif_segment(std::fs::read(&path).unwrap(), &orientation_tiff(6));
        std::fs::write(&path, with_exif).unwrap();
        assert_eq!(orientation_of(&path), Some(6));

        let resizer = ImageResizer::new(200, 90);
        let outcome = resizer.resize_in_place(&path).await.unwrap();

        assert_eq!(
            outcome,
            ResizeOutcome::Resized {
                from: (400, 200),
                to: (200, 100)
            }
        );
        assert_eq!(orientation_of(&path), Some(6));
        assert_eq!(image::open(&path).unwrap().dimensions(), (200, 100));
    }

    #[tokio::test]
    async fn test_resize_without_exif_writes_plain_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.jpg");
        write_jpeg(&path, 400, 200);

        ImageResizer::new(200, 90).resize_in_place(&path).await.unwrap();
        assert_eq!(orientation_of(&path), None);
    }

    #[test]
    fn test_is_resizable() {
        assert!(is_resizable(Path::new("/out/a.jpg")));
        assert!(!is_resizable(Path::new("/out/a.png")));
        assert!(!is_resizable(Path::new("/out/a.mov")));
    }
}
