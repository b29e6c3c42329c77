//! # Path Resolution Module
//!
//! Centralizza la logica che rende unico ogni path di output del batch.
//!
//! I record vengono visitati nell'ordine della scansione contro un set `seen`
//! posseduto dal chiamante. Il primo record tiene il nome candidato, i
//! successivi con lo stesso candidato ricevono un suffisso `-NN` prima
//! dell'estensione:
//!
//! ```text
//! 2024-05-01-10-00-00-000.jpg
//! 2024-05-01-10-00-00-000-02.jpg
//! 2024-05-01-10-00-00-000-03.jpg
//! ```
//!
//! Oltre 99 collisioni il contatore cresce (`-100`, `-101`, ...). I path
//! reclamati non vengono mai rilasciati, anche se il trasferimento fallisce.

use crate::record::{FileRecord, FileState};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// First disambiguator used on a collision
const FIRST_SUFFIX: usize = 2;

/// Resolve the target paths of all records in order, claiming each in `seen`.
pub fn resolve_names(records: &mut [FileRecord], seen: &mut HashSet<PathBuf>) {
    for record in records.iter_mut() {
        let resolved = claim_unique(&record.target_path, seen);
        if resolved != record.target_path {
            debug!(
                "Name collision for {}: {} -> {}",
                record.source_path.display(),
                record.target_path.display(),
                resolved.display()
            );
            record.target_path = resolved;
        }
        record.state = FileState::Resolved;
    }
}

/// Claim `path`, or the first free disambiguated variant of it.
pub fn claim_unique(path: &Path, seen: &mut HashSet<PathBuf>) -> PathBuf {
    if seen.insert(path.to_path_buf()) {
        return path.to_path_buf();
    }

    let mut n = FIRST_SUFFIX;
    loop {
        let candidate = with_suffix(path, n);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Insert `-NN` immediately before the extension of `path`.
fn with_suffix(path: &Path, n: usize) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let file_name = match path.extension() {
        Some(ext) => format!("{}-{:02}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}-{:02}", stem, n),
    };
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::DiscoveredFile;
    use chrono::{Local, TimeZone};

    fn record(source: &str, group_dir: &str) -> FileRecord {
        let root = PathBuf::from("/in");
        FileRecord::with_timestamp(
            DiscoveredFile {
                source_path: root.join(group_dir).join(source),
                source_dir: root.join(group_dir),
            },
            Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            &root,
            Path::new("/out"),
        )
    }

    #[test]
    fn test_second_collision_gets_02() {
        let mut records = vec![record("a.jpg", ""), record("b.JPEG", "")];
        let mut seen = HashSet::new();

        resolve_names(&mut records, &mut seen);

        assert_eq!(
            records[0].target_path,
            PathBuf::from("/out/2024-05-01-10-00-00-000.jpg")
        );
        assert_eq!(
            records[1].target_path,
            PathBuf::from("/out/2024-05-01-10-00-00-000-02.jpg")
        );
        assert!(records.iter().all(|r| r.state == FileState::Resolved));
    }

    #[test]
    fn test_different_groups_do_not_collide() {
        let mut records = vec![record("a.jpg", "Ceremony"), record("a.jpg", "Party")];
        let mut seen = HashSet::new();

        resolve_names(&mut records, &mut seen);

        assert!(records[0].target_path.ends_with("2024-05-01-10-00-00-000-ceremony.jpg"));
        assert!(records[1].target_path.ends_with("2024-05-01-10-00-00-000-party.jpg"));
    }

    #[test]
    fn test_all_targets_unique_for_large_batch() {
        let mut records: Vec<FileRecord> = (0..150).map(|i| record(&format!("{}.jpg", i), "")).collect();
        let mut seen = HashSet::new();

        resolve_names(&mut records, &mut seen);

        let unique: HashSet<&PathBuf> = records.iter().map(|r| &r.target_path).collect();
        assert_eq!(unique.len(), records.len());
        assert!(records[99].target_path.ends_with("2024-05-01-10-00-00-000-100.jpg"));
        assert_eq!(seen.len(), 150);
    }

    #[test]
    fn test_suffixed_name_already_claimed_is_skipped() {
        let mut seen = HashSet::new();
        seen.insert(PathBuf::from("/out/x.jpg"));
        seen.insert(PathBuf::from("/out/x-02.jpg"));

        assert_eq!(claim_unique(Path::new("/out/x.jpg"), &mut seen), PathBuf::from("/out/x-03.jpg"));
        assert_eq!(claim_unique(Path::new("/out/y.jpg"), &mut seen), PathBuf::from("/out/y.jpg"));
    }

    #[test]
    fn test_collision_is_case_sensitive() {
        let mut seen = HashSet::new();
        assert_eq!(claim_unique(Path::new("/out/a.jpg"), &mut seen), PathBuf::from("/out/a.jpg"));
        assert_eq!(claim_unique(Path::new("/out/A.jpg"), &mut seen), PathBuf::from("/out/A.jpg"));
    }
}
