//! The SystemFilesCleaner deny-list (`spec.md` Glossary): noise patterns
//! stripped out during archive expansion.

/// Directory-name components that, anywhere in a path, mark the whole
/// entry as noise.
const NOISE_DIR_NAMES: &[&str] = &["__MACOSX", ".git", ".idea", "__pycache__", ".ipynb_checkpoints"];

/// Exact file names that are noise regardless of directory.
const NOISE_FILE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Whether `archive_path` (a `/`-separated path as stored inside the zip)
/// should be stripped during expansion.
pub fn is_noise(archive_path: &str) -> bool {
    let components: Vec<&str> = archive_path.split('/').filter(|c| !c.is_empty()).collect();

    if components.iter().any(|c| NOISE_DIR_NAMES.contains(c)) {
        return true;
    }

    let Some(file_name) = components.last() else {
        return false;
    };

    if NOISE_FILE_NAMES.contains(file_name) {
        return true;
    }

    if file_name.starts_with("~$") {
        return true;
    }

    if file_name.ends_with(".bak") || file_name.ends_with(".swp") {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_macosx_metadata_directory() {
        assert!(is_noise("__MACOSX/._data.csv"));
    }

    #[test]
    fn strips_ds_store() {
        assert!(is_noise("folder/.DS_Store"));
    }

    #[test]
    fn strips_office_temp_files() {
        assert!(is_noise("docs/~$invoice.xlsx"));
    }

    #[test]
    fn strips_editor_backups() {
        assert!(is_noise("src/main.rs.bak"));
        assert!(is_noise("src/main.rs.swp"));
    }

    #[test]
    fn keeps_ordinary_files() {
        assert!(!is_noise("data/sample_001.csv"));
    }
}
