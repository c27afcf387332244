//! AVI (RIFF) segment parsing.
//!
//! Only the structure needed to locate video frames is read: the `avih`
//! and first video `strh` headers for timing, then `idx1` (or a walk of the
//! `movi` list) for the frame chunks.

mod chunks;
mod reader;

pub use chunks::{Chunk, ChunkId, MainHeader, StreamHeader, StreamType};
pub use reader::{AviFile, AviReader};

use frameseek_common::FormatKind;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::frame_table::FrameTable;
use crate::segment::{Segment, SegmentFormat};
use crate::Result;

/// Timing used when a file declares no frame rate at all.
pub const DEFAULT_FALLBACK_RATE: u32 = 5;

/// AVI segment format.
#[derive(Debug, Clone, Copy)]
pub struct AviFormat {
    fallback_rate: u32,
}

impl AviFormat {
    /// Create an AVI format that spaces frames at `fallback_rate` when a
    /// file carries no timing of its own.
    pub fn new(fallback_rate: u32) -> Self {
        Self {
            fallback_rate: fallback_rate.max(1),
        }
    }
}

impl Default for AviFormat {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_RATE)
    }
}

impl SegmentFormat for AviFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Avi
    }

    fn open(&self, path: &Path) -> Result<Segment> {
        let file = File::open(path)?;
        let avi = AviReader::new(BufReader::new(file)).parse()?;

        let (frame_rate, fps) = match avi.fps() {
            // Sub-0.5 fps still counts as a known rate
            Some(fps) if fps > 0.0 => ((fps.round() as u32).max(1), fps),
            _ => {
                tracing::warn!(
                    path = %path.display(),
                    fallback_rate = self.fallback_rate,
                    "AVI declares no frame rate, spacing frames at fallback rate"
                );
                (0, self.fallback_rate as f64)
            }
        };

        // Dropped frames keep their time slot but are not exposed
        let frames = FrameTable::from_triples(
            avi.chunks
                .iter()
                .enumerate()
                .filter(|(_, chunk)| chunk.1 > 0)
                .map(|(pos, &(offset, size))| {
                    let ts = (pos as f64 * 1000.0 / fps).round() as i64;
                    (ts, offset, size)
                }),
        );

        let dropped = avi.chunks.len() as u32 - frames.len();
        tracing::debug!(
            path = %path.display(),
            frames = frames.len(),
            dropped,
            frame_rate,
            indexed = avi.indexed,
            "Opened AVI segment"
        );

        Ok(Segment::new(path, FormatKind::Avi, frame_rate, frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_frame, AviFixture, IndexMode};
    use crate::Error;

    #[test]
    fn test_open_segment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seg_0001.avi");
        let frames: Vec<_> = (0..3).map(|i| jpeg_frame(i, 24)).collect();
        AviFixture::new(25)
            .frames(frames.clone())
            .write_to(&path)
            .unwrap();

        let segment = AviFormat::default().open(&path).unwrap();
        assert_eq!(segment.format(), FormatKind::Avi);
        assert_eq!(segment.frame_rate(), 25);
        assert_eq!(segment.frame_count(), 3);
        assert!(!segment.is_anchored());

        let timestamps: Vec<i64> = segment.frames().iter().map(|f| f.timestamp).collect();
        assert_eq!(timestamps, vec![0, 40, 80]);

        let payload = segment.frame_payload(2).unwrap();
        assert_eq!(payload.read().unwrap().as_ref(), frames[2].as_slice());
    }

    #[test]
    fn test_dropped_frame_keeps_time_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.avi");
        AviFixture::new(10)
            .frame(jpeg_frame(0, 8))
            .dropped_frame()
            .frame(jpeg_frame(1, 8))
            .index_mode(IndexMode::None)
            .write_to(&path)
            .unwrap();

        let segment = AviFormat::default().open(&path).unwrap();
        assert_eq!(segment.frame_count(), 2);
        assert_eq!(segment.frame_timestamp(1), Some(200));
    }

    #[test]
    fn test_anchored_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20200514_103000.avi");
        AviFixture::new(5)
            .frames((0..2).map(|i| jpeg_frame(i, 8)))
            .write_to(&path)
            .unwrap();

        let segment = AviFormat::default().open(&path).unwrap();
        assert!(segment.is_anchored());
        assert_eq!(segment.start_time(), 1_589_452_200_000);
        assert_eq!(segment.end_time(), 1_589_452_200_200);
    }

    #[test]
    fn test_no_timing_uses_fallback_spacing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.avi");
        AviFixture::new(0)
            .frames((0..3).map(|i| jpeg_frame(i, 8)))
            .strh_rate(0, 0)
            .write_to(&path)
            .unwrap();

        let segment = AviFormat::new(4).open(&path).unwrap();
        assert_eq!(segment.frame_rate(), 0);
        assert_eq!(segment.frame_timestamp(2), Some(500));
    }

    #[test]
    fn test_slow_rate_is_not_reported_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timelapse.avi");
        AviFixture::new(0)
            .frames((0..2).map(|i| jpeg_frame(i, 8)))
            .strh_rate(10, 3)
            .write_to(&path)
            .unwrap();

        let segment = AviFormat::default().open(&path).unwrap();
        assert_eq!(segment.frame_rate(), 1);
        assert_eq!(segment.frame_timestamp(1), Some(3333));
    }

    #[test]
    fn test_open_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.avi");
        std::fs::write(&path, b"not a riff file").unwrap();

        let err = AviFormat::default().open(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidAvi(_)));
    }

    #[test]
    fn test_supports_extension() {
        let format = AviFormat::default();
        assert!(format.supports(Path::new("x/CLIP.AVI")));
        assert!(!format.supports(Path::new("x/clip.mjpg")));
        assert_eq!(format.name(), "avi");
    }
}
