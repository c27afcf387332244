//! Segments and the per-format open capability.

use bytes::Bytes;
use frameseek_common::{paths::has_extension, time::start_time_from_path, FormatKind};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::frame_table::FrameTable;
use crate::Result;

/// A segment container format.
///
/// Implementations parse one file into a [`Segment`]; they never hold the
/// file open afterwards.
pub trait SegmentFormat {
    /// Which container this implementation parses.
    fn kind(&self) -> FormatKind;

    /// Parse the file at `path`.
    fn open(&self, path: &Path) -> Result<Segment>;

    /// Human-readable name.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Check whether `path` looks like a file of this format.
    ///
    /// Only the extension is inspected; `true` does not guarantee that
    /// [`SegmentFormat::open`] succeeds.
    fn supports(&self, path: &Path) -> bool {
        has_extension(path, self.kind().extensions())
    }
}

/// Opaque handle to the encoded bytes of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FramePayload {
    /// Segment file holding the frame.
    pub path: PathBuf,
    /// Byte offset of the payload.
    pub offset: u64,
    /// Payload length in bytes.
    pub size: u32,
}

impl FramePayload {
    /// Read the payload bytes from disk.
    pub fn read(&self) -> std::io::Result<Bytes> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;
        let mut data = vec![0u8; self.size as usize];
        file.read_exact(&mut data)?;
        Ok(Bytes::from(data))
    }
}

/// One opened segment file.
///
/// Frame timestamps are absolute: relative to the segment's start time,
/// which is either recovered from the file name (the segment is then
/// *anchored*) or assigned later when the segment is placed on a timeline.
#[derive(Debug, Clone)]
pub struct Segment {
    path: PathBuf,
    format: FormatKind,
    frame_rate: u32,
    start_time: i64,
    anchored: bool,
    frames: FrameTable,
}

impl Segment {
    /// Create a segment from frames timed relative to the segment start.
    ///
    /// When the file name encodes a start time the frames are shifted onto
    /// it and the segment is anchored.
    pub fn new(path: impl Into<PathBuf>, format: FormatKind, frame_rate: u32, frames: FrameTable) -> Self {
        let path = path.into();
        let segment = Self {
            start_time: 0,
            anchored: false,
            path,
            format,
            frame_rate,
            frames,
        };
        match start_time_from_path(&segment.path) {
            Some(start) => segment.anchored_at(start),
            None => segment,
        }
    }

    /// Anchor the segment so that its start time is `start`.
    pub fn anchored_at(mut self, start: i64) -> Self {
        self.rebase(start);
        self.anchored = true;
        self
    }

    /// Move the segment start to `start`, shifting every frame with it.
    ///
    /// Anchoring is left untouched.
    pub fn rebase(&mut self, start: i64) {
        self.frames.shift(start.saturating_sub(self.start_time));
        self.start_time = start;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FormatKind {
        self.format
    }

    /// Nominal frame rate in frames per second (0 when unknown).
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn frame_count(&self) -> u32 {
        self.frames.len()
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    /// Timestamp of the last frame, or the start time when empty.
    pub fn end_time(&self) -> i64 {
        self.frames.last_timestamp().unwrap_or(self.start_time)
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    /// Timestamp of frame `index`.
    pub fn frame_timestamp(&self, index: u32) -> Option<i64> {
        self.frames.get(index).map(|f| f.timestamp)
    }

    /// Payload handle of frame `index`.
    pub fn frame_payload(&self, index: u32) -> Option<FramePayload> {
        self.frames.get(index).map(|f| FramePayload {
            path: self.path.clone(),
            offset: f.offset,
            size: f.size,
        })
    }

    /// Nominal spacing between frames in milliseconds.
    ///
    /// Derived from the frame rate, else from the observed frame spacing,
    /// else 0.
    pub fn frame_interval(&self) -> i64 {
        if self.frame_rate > 0 {
            (1000.0 / self.frame_rate as f64).round() as i64
        } else {
            self.frames.mean_interval().unwrap_or(0).max(0)
        }
    }
}
