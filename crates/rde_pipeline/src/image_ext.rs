//! Shared image-extension sniffing used by the raw copier and thumbnail
//! generator. No magic-byte inspection; extension matching is what
//! `spec.md` §4.C6 describes for routing raw files into image buckets.

use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".tif", ".tiff"];

pub fn is_image(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}
