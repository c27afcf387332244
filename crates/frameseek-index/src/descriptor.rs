//! Load-time summaries of segments.

use frameseek_media::Segment;
use std::path::PathBuf;

/// Summary of one retained segment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentDescriptor {
    pub path: PathBuf,
    /// Path relative to the scanned directory; its order is the segment order.
    pub ordering_key: String,
    pub frame_count: u32,
    /// Nominal rate in frames per second (0 when unknown).
    pub frame_rate: u32,
    pub start_time: i64,
    pub end_time: i64,
    /// Whether the start time came from the file name.
    pub anchored: bool,
    /// Whether frame timestamps never decrease.
    pub monotonic: bool,
}

impl SegmentDescriptor {
    pub(crate) fn describe(segment: &Segment, ordering_key: String, monotonic: bool) -> Self {
        Self {
            path: segment.path().to_path_buf(),
            ordering_key,
            frame_count: segment.frame_count(),
            frame_rate: segment.frame_rate(),
            start_time: segment.start_time(),
            end_time: segment.end_time(),
            anchored: segment.is_anchored(),
            monotonic,
        }
    }
}

/// Why a candidate file was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipReason {
    /// The file could not be parsed.
    OpenFailed(String),
    /// The file parsed but holds no frames.
    Empty,
    /// Frame timestamps run backwards (rejected by policy).
    NonMonotonic,
    /// The segment starts before the previous one ends (rejected by policy).
    Overlapping,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenFailed(e) => write!(f, "open failed: {e}"),
            Self::Empty => write!(f, "no frames"),
            Self::NonMonotonic => write!(f, "timestamps out of order"),
            Self::Overlapping => write!(f, "overlaps previous segment"),
        }
    }
}

/// A candidate file that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of the last `load`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadReport {
    /// Retained segments in timeline order.
    pub segments: Vec<SegmentDescriptor>,
    pub skipped: Vec<SkippedFile>,
    /// Set when the mean segment rate was not positive and the default was used.
    pub degenerate_frame_rate: bool,
}
