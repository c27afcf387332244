//! Time utilities.
//!
//! Timestamps are `i64` milliseconds since the Unix epoch throughout
//! frameseek. Segment files carry no reliable wall-clock time inside the
//! container, so recorders encode the capture start in the file name; this
//! module recovers it.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::path::Path;

/// Date-time layouts accepted in file stems, most specific first.
const STEM_FORMATS: &[&str] = &["%Y%m%d_%H%M%S", "%Y-%m-%d_%H-%M-%S", "%Y%m%dT%H%M%S"];

/// Extract a segment start time (epoch milliseconds) from a file name.
///
/// Accepted stems:
/// - 13 digits: epoch milliseconds (`1589452800123.avi`)
/// - 10 digits: epoch seconds (`1589452800.avi`)
/// - `20200514_103000`, `2020-05-14_10-30-00`, `20200514T103000`, each
///   optionally followed by `_NNN` milliseconds. Parsed as UTC.
///
/// Returns `None` for anything else.
pub fn start_time_from_path(path: &Path) -> Option<i64> {
    let stem = path.file_stem()?.to_str()?;
    start_time_from_stem(stem)
}

fn start_time_from_stem(stem: &str) -> Option<i64> {
    if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
        return match stem.len() {
            13 => stem.parse().ok(),
            10 => stem.parse::<i64>().ok().map(|secs| secs * 1000),
            _ => None,
        };
    }

    if let Some(ms) = parse_date_time(stem) {
        return Some(ms);
    }

    // Trailing "_NNN" milliseconds
    let (head, tail) = stem.rsplit_once('_')?;
    if tail.len() != 3 || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let millis: i64 = tail.parse().ok()?;
    parse_date_time(head).map(|ms| ms + millis)
}

fn parse_date_time(s: &str) -> Option<i64> {
    STEM_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt)
            .ok()
            .map(|dt| dt.and_utc().timestamp_millis())
    })
}

/// Render epoch milliseconds as RFC 3339 with millisecond precision.
///
/// Values outside chrono's representable range fall back to the raw number.
pub fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_stems() {
        assert_eq!(
            start_time_from_path(Path::new("1589452800123.avi")),
            Some(1_589_452_800_123)
        );
        assert_eq!(
            start_time_from_path(Path::new("dir/1589452800.mjpg")),
            Some(1_589_452_800_000)
        );
        assert_eq!(start_time_from_path(Path::new("0001.avi")), None);
    }

    #[test]
    fn test_date_time_stems() {
        let expected = 1_589_452_200_000; // 2020-05-14T10:30:00Z
        assert_eq!(
            start_time_from_path(Path::new("20200514_103000.avi")),
            Some(expected)
        );
        assert_eq!(
            start_time_from_path(Path::new("2020-05-14_10-30-00.avi")),
            Some(expected)
        );
        assert_eq!(
            start_time_from_path(Path::new("20200514T103000.avi")),
            Some(expected)
        );
        assert_eq!(
            start_time_from_path(Path::new("20200514_103000_250.avi")),
            Some(expected + 250)
        );
    }

    #[test]
    fn test_unrecognized_stems() {
        assert_eq!(start_time_from_path(Path::new("camera.avi")), None);
        assert_eq!(start_time_from_path(Path::new("20200514_103000_25.avi")), None);
        assert_eq!(start_time_from_path(Path::new("seg_001.avi")), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1_589_452_200_250), "2020-05-14T10:30:00.250Z");
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }
}
