//! Path utilities for matching segment files by extension.
//!
//! Discovery and the `can_handle` probes both go through [`has_extension`],
//! so the comparison rules (case-insensitive, no leading dot) live here.

use std::path::{Component, Path};

/// Extensions of AVI (RIFF) segment files.
pub const AVI_EXTENSIONS: &[&str] = &["avi"];

/// Extensions of raw concatenated-JPEG segment files.
pub const MJPEG_EXTENSIONS: &[&str] = &["mjpg", "mjpeg"];

/// Check if a path carries one of the given extensions.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use frameseek_common::paths::{has_extension, AVI_EXTENSIONS};
///
/// assert!(has_extension(Path::new("seg_0001.AVI"), AVI_EXTENSIONS));
/// assert!(!has_extension(Path::new("seg_0001.avi.part"), AVI_EXTENSIONS));
/// assert!(!has_extension(Path::new("avi"), AVI_EXTENSIONS));
/// ```
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Path of `path` relative to `root`, rendered with `/` separators.
///
/// Falls back to the full path (minus any root or prefix) when `path` is not
/// under `root`.
pub fn ordering_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mjpeg_extensions() {
        assert!(has_extension(Path::new("a.mjpg"), MJPEG_EXTENSIONS));
        assert!(has_extension(Path::new("a.MJPEG"), MJPEG_EXTENSIONS));
        assert!(!has_extension(Path::new("a.jpg"), MJPEG_EXTENSIONS));
    }

    #[test]
    fn test_no_extension() {
        assert!(!has_extension(Path::new("Makefile"), AVI_EXTENSIONS));
        assert!(!has_extension(Path::new(".avi"), AVI_EXTENSIONS));
    }

    #[test]
    fn test_ordering_key() {
        let root = Path::new("/logs/dive");
        assert_eq!(
            ordering_key(root, Path::new("/logs/dive/Video/0001.avi")),
            "Video/0001.avi"
        );
        assert_eq!(
            ordering_key(root, Path::new("/elsewhere/0001.avi")),
            "elsewhere/0001.avi"
        );
    }
}
