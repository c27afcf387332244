//! Frameseek-Media: segment file parsing and frame tables
//!
//! This crate turns individual segment files into [`Segment`]s: an ordered
//! table of frames, each with a timestamp and the byte range of its encoded
//! payload inside the file. Nothing here decodes pixels; payloads stay opaque.
//!
//! # Modules
//!
//! - `avi` - RIFF/AVI parsing (hdrl headers, idx1 index, movi walk)
//! - `mjpeg` - raw concatenated-JPEG stream scanning
//! - `frame_table` - per-segment frame entries and nearest-time search
//! - `segment` - the [`Segment`] value and the [`SegmentFormat`] trait
//!
//! # Architecture
//!
//! Each supported container implements [`SegmentFormat`]. Opening a file:
//!
//! 1. Parses the container to find the frame chunks of the video stream
//! 2. Assigns each frame a timestamp relative to the segment start
//! 3. Anchors the segment to wall-clock time when the file name encodes it
//!
//! Segment files are never held open; a [`FramePayload`] reopens the file
//! when the caller asks for the frame bytes.

pub mod avi;
pub mod error;
pub mod frame_table;
pub mod mjpeg;
pub mod segment;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use avi::AviFormat;
pub use error::{Error, Result};
pub use frame_table::{FrameEntry, FrameTable};
pub use mjpeg::MjpegFormat;
pub use segment::{FramePayload, Segment, SegmentFormat};
