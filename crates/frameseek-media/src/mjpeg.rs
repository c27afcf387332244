//! Raw MJPEG stream scanning.
//!
//! A raw MJPEG file is a plain concatenation of JPEG images. Frame
//! boundaries are found by walking the JPEG marker structure rather than by
//! searching for `FF D8`/`FF D9`, so marker segment payloads (comments,
//! EXIF thumbnails) and entropy-coded data never produce false boundaries.

use frameseek_common::FormatKind;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::frame_table::FrameTable;
use crate::segment::{Segment, SegmentFormat};
use crate::{Error, Result};

/// Frame rate assumed for raw streams when none is configured.
pub const DEFAULT_MJPEG_FRAME_RATE: u32 = 5;

const BLOCK_SIZE: usize = 64 * 1024;

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const TEM: u8 = 0x01;

fn is_rst(marker: u8) -> bool {
    (0xD0..=0xD7).contains(&marker)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Outside a frame, looking for `FF`.
    Seek,
    /// Outside a frame, after `FF`.
    SeekMarker,
    /// Inside the header section, expecting a marker.
    Header,
    /// After `FF` in the header section.
    Marker,
    /// Reading the two length bytes of a marker segment.
    Length { high: Option<u8>, sos: bool },
    /// Skipping a marker segment payload.
    Skip { remaining: u32, sos: bool },
    /// Inside entropy-coded data.
    Entropy,
    /// After `FF` inside entropy-coded data.
    EntropyMarker,
}

/// Incremental JPEG boundary scanner.
///
/// Feed consecutive blocks of a stream; complete `SOI..EOI` spans are
/// collected as `(offset, size)`.
#[derive(Debug)]
pub struct FrameScanner {
    state: State,
    frame_start: u64,
    frames: Vec<(u64, u64)>,
    restarts: u32,
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScanner {
    pub fn new() -> Self {
        Self {
            state: State::Seek,
            frame_start: 0,
            frames: Vec::new(),
            restarts: 0,
        }
    }

    /// Scan `block`, whose first byte sits at stream offset `base`.
    pub fn feed(&mut self, block: &[u8], base: u64) {
        let mut i = 0;
        while i < block.len() {
            let pos = base + i as u64;

            // Bulk-skip marker payloads
            if let State::Skip { remaining, sos } = self.state {
                let take = (remaining as usize).min(block.len() - i);
                i += take;
                let remaining = remaining - take as u32;
                self.state = if remaining > 0 {
                    State::Skip { remaining, sos }
                } else if sos {
                    State::Entropy
                } else {
                    State::Header
                };
                continue;
            }

            let byte = block[i];
            self.state = match self.state {
                State::Seek => {
                    if byte == 0xFF {
                        State::SeekMarker
                    } else {
                        State::Seek
                    }
                }
                State::SeekMarker => match byte {
                    SOI => {
                        self.frame_start = pos - 1;
                        State::Header
                    }
                    0xFF => State::SeekMarker,
                    _ => State::Seek,
                },
                State::Header => {
                    if byte == 0xFF {
                        State::Marker
                    } else {
                        self.abandon(pos, "expected marker in header");
                        State::Seek
                    }
                }
                State::Marker => self.marker(byte, pos),
                State::Length { high: None, sos } => State::Length {
                    high: Some(byte),
                    sos,
                },
                State::Length {
                    high: Some(high),
                    sos,
                } => {
                    let length = u16::from_be_bytes([high, byte]) as u32;
                    if length < 2 {
                        self.abandon(pos, "marker length below 2");
                        State::Seek
                    } else if length == 2 {
                        if sos {
                            State::Entropy
                        } else {
                            State::Header
                        }
                    } else {
                        State::Skip {
                            remaining: length - 2,
                            sos,
                        }
                    }
                }
                State::Entropy => {
                    if byte == 0xFF {
                        State::EntropyMarker
                    } else {
                        State::Entropy
                    }
                }
                State::EntropyMarker => match byte {
                    0x00 => State::Entropy,
                    0xFF => State::EntropyMarker,
                    b if is_rst(b) => State::Entropy,
                    b => self.marker(b, pos),
                },
                State::Skip { .. } => unreachable!("handled above"),
            };
            i += 1;
        }
    }

    /// Handle the marker byte following `FF` inside a frame.
    fn marker(&mut self, marker: u8, pos: u64) -> State {
        match marker {
            0xFF => State::Marker,
            SOI => {
                // New image before EOI: the previous one is incomplete
                self.restarts += 1;
                self.frame_start = pos - 1;
                State::Header
            }
            EOI => {
                self.frames.push((self.frame_start, pos + 1 - self.frame_start));
                State::Seek
            }
            TEM => State::Header,
            m if is_rst(m) => State::Header,
            0x00 => {
                self.abandon(pos, "stuffed byte outside entropy data");
                State::Seek
            }
            m => State::Length {
                high: None,
                sos: m == SOS,
            },
        }
    }

    fn abandon(&mut self, pos: u64, reason: &str) {
        self.restarts += 1;
        tracing::trace!(
            frame_start = self.frame_start,
            position = pos,
            reason,
            "Dropping malformed JPEG frame"
        );
    }

    /// Whether the stream ended inside a frame.
    pub fn in_frame(&self) -> bool {
        !matches!(self.state, State::Seek | State::SeekMarker)
    }

    /// Number of frames dropped as malformed or interrupted.
    pub fn dropped(&self) -> u32 {
        self.restarts
    }

    /// Complete frames found so far as `(offset, size)`.
    pub fn frames(&self) -> &[(u64, u64)] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<(u64, u64)> {
        self.frames
    }
}

/// Scan a whole stream for complete JPEG frames.
pub fn scan_frames<R: Read>(mut reader: R) -> Result<FrameScanner> {
    let mut scanner = FrameScanner::new();
    let mut block = vec![0u8; BLOCK_SIZE];
    let mut base = 0u64;

    loop {
        let n = reader.read(&mut block)?;
        if n == 0 {
            break;
        }
        scanner.feed(&block[..n], base);
        base += n as u64;
    }

    Ok(scanner)
}

/// Raw MJPEG segment format.
#[derive(Debug, Clone, Copy)]
pub struct MjpegFormat {
    frame_rate: u32,
}

impl MjpegFormat {
    /// Create a format assigning `frame_rate` to every stream (raw streams
    /// carry no timing of their own).
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
        }
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }
}

impl Default for MjpegFormat {
    fn default() -> Self {
        Self::new(DEFAULT_MJPEG_FRAME_RATE)
    }
}

impl SegmentFormat for MjpegFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Mjpeg
    }

    fn open(&self, path: &Path) -> Result<Segment> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let scanner = scan_frames(file)?;

        if scanner.in_frame() {
            tracing::debug!(path = %path.display(), "MJPEG stream ends mid-frame, dropping tail");
        }
        if scanner.dropped() > 0 {
            tracing::debug!(
                path = %path.display(),
                dropped = scanner.dropped(),
                "Skipped malformed JPEG frames"
            );
        }
        if scanner.frames().is_empty() && file_size > 0 && !scanner.in_frame() {
            return Err(Error::invalid_jpeg("no JPEG start-of-image marker found"));
        }

        let rate = self.frame_rate as f64;
        let mut triples = Vec::with_capacity(scanner.frames().len());
        for (i, (offset, size)) in scanner.into_frames().into_iter().enumerate() {
            let size = u32::try_from(size)
                .map_err(|_| Error::unsupported(format!("JPEG frame of {size} bytes")))?;
            let ts = (i as f64 * 1000.0 / rate).round() as i64;
            triples.push((ts, offset, size));
        }

        let frames = FrameTable::from_triples(triples);
        tracing::debug!(
            path = %path.display(),
            frames = frames.len(),
            frame_rate = self.frame_rate,
            "Opened MJPEG segment"
        );

        Ok(Segment::new(path, FormatKind::Mjpeg, self.frame_rate, frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_frame, write_mjpeg};

    fn scan(bytes: &[u8]) -> Vec<(u64, u64)> {
        scan_frames(bytes).unwrap().into_frames()
    }

    #[test]
    fn test_back_to_back_frames() {
        let frames: Vec<_> = (0..3).map(|i| jpeg_frame(i, 40)).collect();
        let stream = frames.concat();

        let found = scan(&stream);
        assert_eq!(found.len(), 3);
        let mut offset = 0u64;
        for (frame, &(start, size)) in frames.iter().zip(&found) {
            assert_eq!(start, offset);
            assert_eq!(size, frame.len() as u64);
            offset += size;
        }
    }

    #[test]
    fn test_eoi_inside_marker_payload_ignored() {
        // jpeg_frame embeds FF D9 inside a COM segment
        let frame = jpeg_frame(7, 10);
        let found = scan(&frame);
        assert_eq!(found, vec![(0, frame.len() as u64)]);
    }

    #[test]
    fn test_stuffed_and_restart_bytes() {
        // Seed chosen so the entropy pattern produces 0xFF and needs stuffing
        let frame = jpeg_frame(1, 300);
        assert!(frame.windows(2).any(|w| w == [0xFF, 0x00]));
        assert!(frame.windows(2).any(|w| w == [0xFF, 0xD0]));
        assert_eq!(scan(&frame).len(), 1);
    }

    #[test]
    fn test_garbage_between_frames() {
        let a = jpeg_frame(0, 16);
        let b = jpeg_frame(1, 16);
        let mut stream = vec![0x00, 0xFF, 0x12, 0xFF];
        stream.extend_from_slice(&a);
        stream.extend_from_slice(b"garbage\xFF\xFF");
        let b_start = stream.len() as u64;
        stream.extend_from_slice(&b);

        let found = scan(&stream);
        assert_eq!(found, vec![(4, a.len() as u64), (b_start, b.len() as u64)]);
    }

    #[test]
    fn test_truncated_tail_dropped() {
        let a = jpeg_frame(0, 16);
        let b = jpeg_frame(1, 16);
        let mut stream = [a.clone(), b.clone()].concat();
        stream.truncate(a.len() + b.len() / 2);

        let scanner = scan_frames(stream.as_slice()).unwrap();
        assert!(scanner.in_frame());
        assert_eq!(scanner.frames(), &[(0, a.len() as u64)]);
    }

    #[test]
    fn test_soi_restart_drops_incomplete_frame() {
        let a = jpeg_frame(0, 16);
        let b = jpeg_frame(1, 16);
        let mut stream = a[..a.len() - 2].to_vec();
        let b_start = stream.len() as u64;
        stream.extend_from_slice(&b);

        let scanner = scan_frames(stream.as_slice()).unwrap();
        assert_eq!(scanner.frames(), &[(b_start, b.len() as u64)]);
        assert_eq!(scanner.dropped(), 1);
    }

    #[test]
    fn test_frames_split_across_blocks() {
        let frames: Vec<_> = (0..3).map(|i| jpeg_frame(i, 50)).collect();
        let stream = frames.concat();

        let mut scanner = FrameScanner::new();
        for (n, block) in stream.chunks(7).enumerate() {
            scanner.feed(block, (n * 7) as u64);
        }
        assert_eq!(scanner.frames(), scan(&stream).as_slice());
        assert_eq!(scanner.frames().len(), 3);
    }

    #[test]
    fn test_open_segment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cam.mjpg");
        let frames: Vec<_> = (0..4).map(|i| jpeg_frame(i, 12)).collect();
        write_mjpeg(&path, &frames).unwrap();

        let segment = MjpegFormat::new(10).open(&path).unwrap();
        assert_eq!(segment.format(), FormatKind::Mjpeg);
        assert_eq!(segment.frame_rate(), 10);
        assert_eq!(segment.frame_count(), 4);
        assert_eq!(segment.frame_timestamp(3), Some(300));
        assert_eq!(
            segment.frame_payload(1).unwrap().read().unwrap().as_ref(),
            frames[1].as_slice()
        );
    }

    #[test]
    fn test_open_without_jpeg_data_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.mjpeg");
        std::fs::write(&path, b"hello world").unwrap();

        let err = MjpegFormat::default().open(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidJpeg(_)));
    }

    #[test]
    fn test_open_empty_file_has_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mjpg");
        std::fs::write(&path, b"").unwrap();

        let segment = MjpegFormat::default().open(&path).unwrap();
        assert_eq!(segment.frame_count(), 0);
    }
}
