//! Segment file discovery.

use frameseek_common::paths::has_extension;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::IndexConfig;

fn walker(root: &Path, config: &IndexConfig) -> WalkDir {
    let mut walker = WalkDir::new(root)
        .follow_links(config.follow_links)
        .sort_by_file_name();
    if let Some(depth) = config.max_depth {
        walker = walker.max_depth(depth);
    }
    walker
}

/// Files under `root` with one of `extensions`, in walk order.
///
/// Unreadable entries are logged and skipped.
fn candidates<'a>(
    root: &'a Path,
    extensions: &'a [&'a str],
    config: &IndexConfig,
) -> impl Iterator<Item = DirEntry> + 'a {
    walker(root, config)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(move |entry| has_extension(entry.path(), extensions))
}

/// Collect segment candidates under `root`, sorted by path.
///
/// The path order is the segment order on the timeline.
pub fn discover(root: &Path, extensions: &[&str], config: &IndexConfig) -> Vec<PathBuf> {
    let limit = config.max_files.unwrap_or(usize::MAX);
    let mut paths: Vec<PathBuf> = candidates(root, extensions, config)
        .take(limit)
        .map(DirEntry::into_path)
        .collect();

    if paths.len() == limit {
        tracing::debug!(limit, root = %root.display(), "Candidate limit reached");
    }

    paths.sort();
    paths
}

/// Whether `root` holds at least one candidate file.
pub fn has_candidates(root: &Path, extensions: &[&str], config: &IndexConfig) -> bool {
    config.max_files != Some(0) && candidates(root, extensions, config).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b/0002.avi");
        touch(dir.path(), "b/0001.AVI");
        touch(dir.path(), "a.avi");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "c.mjpg");

        let found = discover(dir.path(), &["avi"], &IndexConfig::default());
        let rel: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("a.avi"),
                PathBuf::from("b/0001.AVI"),
                PathBuf::from("b/0002.avi"),
            ]
        );
    }

    #[test]
    fn test_depth_and_file_limits() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "1.avi");
        touch(dir.path(), "2.avi");
        touch(dir.path(), "deep/3.avi");

        let shallow = IndexConfig {
            max_depth: Some(1),
            ..Default::default()
        };
        assert_eq!(discover(dir.path(), &["avi"], &shallow).len(), 2);

        let limited = IndexConfig {
            max_files: Some(1),
            ..Default::default()
        };
        let found = discover(dir.path(), &["avi"], &limited);
        assert_eq!(found, vec![dir.path().join("1.avi")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_follow_links() {
        let outside = tempfile::tempdir().unwrap();
        touch(outside.path(), "clip.avi");
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "local.avi");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).unwrap();

        let found = discover(dir.path(), &["avi"], &IndexConfig::default());
        assert_eq!(found, vec![dir.path().join("local.avi")]);

        let following = IndexConfig {
            follow_links: true,
            ..Default::default()
        };
        let found = discover(dir.path(), &["avi"], &following);
        assert_eq!(
            found,
            vec![dir.path().join("linked/clip.avi"), dir.path().join("local.avi")]
        );
    }

    #[test]
    fn test_has_candidates() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_candidates(dir.path(), &["avi"], &IndexConfig::default()));
        touch(dir.path(), "x/y/clip.avi");
        assert!(has_candidates(dir.path(), &["avi"], &IndexConfig::default()));
        assert!(!has_candidates(dir.path(), &["mjpg"], &IndexConfig::default()));
    }
}
