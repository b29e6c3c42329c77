//! # Naming Module
//!
//! Pure functions that turn a file's creation time and folder lineage into its
//! flat output name:
//!
//! ```text
//! Input root: /photos/Wedding/
//! Source:     /photos/Wedding/Ceremony/Photos/IMG_0042.JPEG  (created 2024-05-01 10:00:00.000)
//! Output:     2024-05-01-10-00-00-000-ceremony-photos.jpg
//! ```
//!
//! Nothing here touches the filesystem; the same inputs always give the same name.

use chrono::{DateTime, Local};
use std::path::{Component, Path};

/// Canonical extension for JPEG output
pub const JPEG_EXTENSION: &str = ".jpg";

/// Extensions (lowercase, no dot) of the HEIC family that get transcoded to JPEG
pub const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

/// Render a timestamp as `YYYY-MM-DD-HH-MM-SS-mmm`.
///
/// Fixed width fields keep the strings sortable: lexicographic order of the
/// output follows chronological order of the input.
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d-%H-%M-%S-%3f").to_string()
}

/// Build the group name from the folders between `input_root` and `dir`.
///
/// Segments are lowercased, spaces become hyphens and the Swedish letters
/// `å`, `ä`, `ö` are folded to `a`, `a`, `o`. An empty string means the file
/// sits directly in the input root.
pub fn format_group_name(dir: &Path, input_root: &Path) -> String {
    let relative = dir.strip_prefix(input_root).unwrap_or(dir);

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| normalize_segment(&segment))
        .collect::<Vec<_>>()
        .join("-")
}

fn normalize_segment(segment: &str) -> String {
    segment
        .to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| c == 'å' || c == 'ä', "a")
        .replace('ö', "o")
}

/// Lowercase an extension and fold `.jpeg` into `.jpg`.
///
/// Accepts the extension with or without its leading dot and always returns it
/// with one. HEIC extensions pass through untouched, they are only rewritten
/// when the file is actually converted.
pub fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim_start_matches('.').to_lowercase();
    match lower.as_str() {
        "" => String::new(),
        "jpeg" => JPEG_EXTENSION.to_string(),
        _ => format!(".{}", lower),
    }
}

/// Normalized extension of a path, empty when it has none
pub fn path_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| normalize_extension(&ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Whether a path belongs to the HEIC family
pub fn is_heic(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            HEIC_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Assemble the candidate file name before deduplication
pub fn candidate_file_name(created: &DateTime<Local>, group: &str, extension: &str) -> String {
    let timestamp = format_timestamp(created);
    if group.is_empty() {
        format!("{}{}", timestamp, extension)
    } else {
        format!("{}-{}{}", timestamp, group, extension)
    }
}
