//! Archive expansion (`spec.md` §4.C3).

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use rde_protocol::error::IoError;

use crate::cleaner::is_noise;

/// Extensions this expander currently handles, as a closed dispatch table
/// (Design Note 9: "dispatch tables, not chained conditionals") rather
/// than an inline `if ends_with(".zip")` check scattered across callers.
pub fn supported_extensions() -> &'static [&'static str] {
    &[".zip"]
}

pub fn is_archive(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
    supported_extensions().iter().any(|ext| name.ends_with(ext))
}

/// Expand `zip_path` into `scratch_dir`, returning the flattened list of
/// extracted paths in deterministic lexicographic-by-archive-path order.
/// OS/tooling noise (Glossary's SystemFilesCleaner deny-list) is
/// stripped. Entries whose resolved path would fall outside
/// `scratch_dir` (archive-traversal attempts) are refused outright.
pub fn expand(zip_path: &Path, scratch_dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    std::fs::create_dir_all(scratch_dir).map_err(|source| IoError::Write {
        path: scratch_dir.to_path_buf(),
        source,
    })?;

    let file = File::open(zip_path).map_err(|source| IoError::Read {
        path: zip_path.to_path_buf(),
        source,
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| IoError::Read {
        path: zip_path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    let mut names: Vec<String> = (0..archive.len())
        .map(|i| {
            archive
                .by_index(i)
                .map(|entry| entry.name().to_string())
                .unwrap_or_default()
        })
        .collect();
    names.sort();

    let mut extracted = Vec::new();
    for name in names {
        if name.is_empty() || is_noise(&name) {
            continue;
        }

        let out_path = safe_join(scratch_dir, &name)?;

        let mut entry = archive.by_name(&name).map_err(|e| IoError::Read {
            path: zip_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|source| IoError::Write {
                path: out_path.clone(),
                source,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| IoError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out_file = File::create(&out_path).map_err(|source| IoError::Write {
            path: out_path.clone(),
            source,
        })?;
        std::io::copy(&mut entry, &mut out_file).map_err(|source| IoError::Write {
            path: out_path.clone(),
            source,
        })?;

        extracted.push(out_path);
    }

    tracing::info!(
        archive = %zip_path.display(),
        extracted = extracted.len(),
        "archive expanded"
    );
    Ok(extracted)
}

/// Join `entry_name` onto `scratch_root`, refusing any entry whose
/// normalized components would escape the root (`..` traversal or an
/// absolute path embedded in the archive).
fn safe_join(scratch_root: &Path, entry_name: &str) -> Result<PathBuf, IoError> {
    let mut joined = scratch_root.to_path_buf();
    for part in entry_name.split('/') {
        match Path::new(part)
            .components()
            .next()
        {
            Some(Component::ParentDir) | Some(Component::RootDir) | Some(Component::Prefix(_)) => {
                return Err(IoError::ArchiveTraversal {
                    entry: entry_name.to_string(),
                    scratch_root: scratch_root.to_path_buf(),
                })
            }
            _ => {}
        }
        if part.is_empty() || part == "." {
            continue;
        }
        joined.push(part);
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_zip(dir: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
        let zip_path = dir.join("bundle.zip");
        let file = File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options: zip::write::FileOptions<()> =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
        zip_path
    }

    #[test]
    fn expands_and_strips_noise() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = make_zip(
            dir.path(),
            &[
                ("data/a.csv", b"1,2,3"),
                ("__MACOSX/._a.csv", b"junk"),
                (".DS_Store", b"junk"),
            ],
        );
        let scratch = dir.path().join("scratch");
        let extracted = expand(&zip_path, &scratch).unwrap();
        assert_eq!(extracted, vec![scratch.join("data/a.csv")]);
    }

    #[test]
    fn deterministic_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = make_zip(
            dir.path(),
            &[("b.csv", b"b"), ("a.csv", b"a"), ("c.csv", b"c")],
        );
        let scratch = dir.path().join("scratch");
        let extracted = expand(&zip_path, &scratch).unwrap();
        assert_eq!(
            extracted,
            vec![scratch.join("a.csv"), scratch.join("b.csv"), scratch.join("c.csv")]
        );
    }

    #[test]
    fn zero_files_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = make_zip(dir.path(), &[(".DS_Store", b"junk")]);
        let scratch = dir.path().join("scratch");
        let extracted = expand(&zip_path, &scratch).unwrap();
        assert!(extracted.is_empty());
    }

    #[test]
    fn rejects_traversal_entries() {
        let joined = safe_join(Path::new("/scratch"), "../etc/passwd");
        assert!(matches!(joined, Err(IoError::ArchiveTraversal { .. })));
    }
}
