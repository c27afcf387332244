//! The capability set shared by every frame index.

use std::path::Path;

use crate::cursor::Cursor;
use crate::error::Result;
use crate::frame::VideoFrame;

/// Frame-accurate navigation over a directory of segments.
///
/// One mutable cursor per instance; callers serialize access.
pub trait FrameDecoder {
    /// Short format name (e.g. "avi").
    fn name(&self) -> &'static str;

    /// Whether `dir` holds at least one file this decoder reads.
    ///
    /// Never modifies the decoder.
    fn can_handle(&self, dir: &Path) -> bool;

    /// Discover and open the segments under `dir`, replacing any previous
    /// state. The cursor lands on frame 0.
    fn load(&mut self, dir: &Path) -> Result<()>;

    /// Total number of frames over all segments.
    fn frame_count(&self) -> u32;

    /// Mean segment frame rate in frames per second.
    fn frame_rate(&self) -> u32;

    /// Current cursor position.
    fn cursor(&self) -> Cursor;

    /// Frame under the cursor; `None` only for an empty index.
    fn current_frame(&self) -> Option<VideoFrame>;

    /// Move the cursor to the frame nearest `timestamp`.
    ///
    /// Fails with `SeekOutOfRange` outside the timeline; the cursor is then
    /// left where it was.
    fn seek_to_time(&mut self, timestamp: i64) -> Result<()>;

    /// Move the cursor to global frame `number`.
    fn seek_to_frame(&mut self, number: u32) -> Result<()>;

    /// Global number of the frame nearest `timestamp`.
    fn frame_number_for_time(&self, timestamp: i64) -> Option<u32>;

    fn has_next(&self) -> bool;

    /// Return the frame under the cursor, then advance one frame.
    fn next(&mut self) -> Result<VideoFrame>;

    fn has_previous(&self) -> bool;

    /// Return the frame under the cursor, then step back one frame.
    fn previous(&mut self) -> Result<VideoFrame>;
}
