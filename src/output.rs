//! Serializable views of index state for CLI output.

use frameseek_common::time::format_timestamp;
use frameseek_index::{Cursor, Decoder, FrameDecoder, LoadReport, SegmentDescriptor, VideoFrame};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One frame as printed by `seek` and `frames`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FrameView {
    pub number: u32,
    pub timestamp: i64,
    /// RFC 3339 rendering of `timestamp`.
    pub time: String,
    pub segment: PathBuf,
    pub offset: u64,
    pub size: u32,
}

impl From<&VideoFrame> for FrameView {
    fn from(frame: &VideoFrame) -> Self {
        Self {
            number: frame.number,
            timestamp: frame.timestamp,
            time: format_timestamp(frame.timestamp),
            segment: frame.payload.path.clone(),
            offset: frame.payload.offset,
            size: frame.payload.size,
        }
    }
}

impl FrameView {
    /// Tab-separated line for plain output.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.number,
            self.timestamp,
            self.time,
            self.segment.display()
        )
    }
}

/// A skipped candidate with a readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedView {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct InspectView {
    pub directory: PathBuf,
    pub decoder: String,
    pub frame_count: u32,
    pub frame_rate: u32,
    pub degenerate_frame_rate: bool,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub segments: Vec<SegmentDescriptor>,
    pub skipped: Vec<SkippedView>,
}

impl InspectView {
    pub fn new(dir: &Path, decoder: &Decoder) -> Self {
        let report: &LoadReport = decoder.report();
        Self {
            directory: dir.to_path_buf(),
            decoder: decoder.name().to_string(),
            frame_count: decoder.frame_count(),
            frame_rate: decoder.frame_rate(),
            degenerate_frame_rate: report.degenerate_frame_rate,
            first_timestamp: decoder.frame_at(0).map(|f| f.timestamp),
            last_timestamp: decoder
                .frame_count()
                .checked_sub(1)
                .and_then(|last| decoder.frame_at(last))
                .map(|f| f.timestamp),
            segments: report.segments.clone(),
            skipped: report
                .skipped
                .iter()
                .map(|s| SkippedView {
                    path: s.path.clone(),
                    reason: s.reason.to_string(),
                })
                .collect(),
        }
    }

    /// Human-readable summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Directory: {}\n", self.directory.display()));
        out.push_str(&format!("Decoder: {}\n", self.decoder));
        out.push_str(&format!("Frames: {}\n", self.frame_count));
        out.push_str(&format!("Frame rate: {} fps", self.frame_rate));
        if self.degenerate_frame_rate {
            out.push_str(" (default)");
        }
        out.push('\n');
        if let (Some(first), Some(last)) = (self.first_timestamp, self.last_timestamp) {
            out.push_str(&format!(
                "Span: {} .. {}\n",
                format_timestamp(first),
                format_timestamp(last)
            ));
        }

        out.push_str(&format!("\nSegments: {}\n", self.segments.len()));
        for (i, segment) in self.segments.iter().enumerate() {
            out.push_str(&format!(
                "  [{}] {} - {} frames @ {} fps, {} .. {}",
                i,
                segment.ordering_key,
                segment.frame_count,
                segment.frame_rate,
                segment.start_time,
                segment.end_time
            ));
            if segment.anchored {
                out.push_str(" [anchored]");
            }
            if !segment.monotonic {
                out.push_str(" [out of order]");
            }
            out.push('\n');
        }

        if !self.skipped.is_empty() {
            out.push_str(&format!("\nSkipped: {}\n", self.skipped.len()));
            for skipped in &self.skipped {
                out.push_str(&format!("  {} ({})\n", skipped.path.display(), skipped.reason));
            }
        }
        out
    }
}

/// Result of `seek`.
#[derive(Debug, Clone, Serialize)]
pub struct SeekView {
    pub cursor: Cursor,
    pub frame: FrameView,
}

impl SeekView {
    pub fn render(&self) -> String {
        format!(
            "Frame {} (segment {}, local frame {})\nTimestamp: {} ({})\nSegment: {}\nPayload: {} bytes at offset {}\n",
            self.frame.number,
            self.cursor.segment_index,
            self.cursor.local_frame_index,
            self.frame.timestamp,
            self.frame.time,
            self.frame.segment.display(),
            self.frame.size,
            self.frame.offset
        )
    }
}
