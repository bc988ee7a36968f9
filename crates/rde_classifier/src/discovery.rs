//! Deterministic, noise-filtered directory listing (`spec.md` §5:
//! "File enumeration within a directory uses a deterministic sort
//! (lexicographic by path)").

use std::path::{Path, PathBuf};

use rde_archive::is_noise;
use rde_protocol::error::IoError;
use walkdir::WalkDir;

/// Non-recursive listing of `dir`'s direct children, lexicographically
/// sorted, noise entries excluded. Used by MultiDataTile's
/// one-group-per-top-level-entry rule.
pub fn list_top_level_entries(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let mut entries = Vec::new();
    let read_dir = std::fs::read_dir(dir).map_err(|source| IoError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in read_dir {
        let entry = entry.map_err(|source| IoError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if is_noise(&name) {
            continue;
        }
        entries.push(path);
    }

    entries.sort();
    Ok(entries)
}

/// Recursive file listing under `dir`, lexicographically sorted by
/// relative path, noise entries excluded at every depth.
pub fn collect_files_recursive(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).into_iter() {
        let entry = entry.map_err(|e| IoError::Read {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let relative_str = relative.to_string_lossy().replace('\\', "/");
        if is_noise(&relative_str) {
            continue;
        }

        files.push(entry.path().to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Whether `name` (file name only) ends with `.zip`.
pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_listing_is_sorted_and_excludes_noise() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), b"b").unwrap();
        std::fs::write(dir.path().join("a.csv"), b"a").unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"junk").unwrap();

        let entries = list_top_level_entries(dir.path()).unwrap();
        assert_eq!(entries, vec![dir.path().join("a.csv"), dir.path().join("b.csv")]);
    }

    #[test]
    fn recursive_listing_descends_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/a.csv"), b"a").unwrap();
        std::fs::write(dir.path().join("top.csv"), b"t").unwrap();

        let files = collect_files_recursive(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }
}
