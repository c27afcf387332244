//! Synthetic segment fixtures.
//!
//! Builds structurally valid AVI files and JPEG-shaped frames for tests and
//! benchmarks. Frames are not decodable images; only the marker structure
//! the scanners rely on is real.

use std::io;
use std::path::Path;

/// How the fixture writes the legacy `idx1` index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Offsets relative to the `movi` form type (the common layout).
    Relative,
    /// Absolute file offsets.
    Absolute,
    /// No `idx1` chunk at all.
    None,
}

/// Build a JPEG-shaped frame.
///
/// The frame carries an APP0 segment, a comment containing a stray EOI
/// sequence, an SOS header, `entropy_len` bytes of entropy-coded data with
/// byte stuffing and a restart marker, and a final EOI.
pub fn jpeg_frame(seed: u8, entropy_len: usize) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];

    // APP0 "JFIF"
    out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    out.extend_from_slice(b"JFIF\0");
    out.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);

    // COM with an EOI lookalike inside its payload
    out.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x06, seed, 0xFF, 0xD9, seed]);

    // SOS
    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);

    for i in 0..entropy_len {
        if i == entropy_len / 2 {
            out.extend_from_slice(&[0xFF, 0xD0]);
        }
        let b = seed.wrapping_mul(31).wrapping_add(i as u8);
        if b == 0xFF {
            out.extend_from_slice(&[0xFF, 0x00]);
        } else {
            out.push(b);
        }
    }

    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// Write frames back to back as a raw MJPEG stream.
pub fn write_mjpeg(path: &Path, frames: &[Vec<u8>]) -> io::Result<()> {
    std::fs::write(path, frames.concat())
}

/// Builder for a minimal MJPEG AVI file.
#[derive(Debug, Clone)]
pub struct AviFixture {
    fps: u32,
    frames: Vec<Vec<u8>>,
    index_mode: IndexMode,
    with_audio: bool,
    audio_only: bool,
    strh_rate: Option<(u32, u32)>,
}

impl AviFixture {
    /// Start a fixture at `fps` frames per second.
    pub fn new(fps: u32) -> Self {
        Self {
            fps,
            frames: Vec::new(),
            index_mode: IndexMode::Relative,
            with_audio: false,
            audio_only: false,
            strh_rate: None,
        }
    }

    /// Append one video frame.
    pub fn frame(mut self, data: Vec<u8>) -> Self {
        self.frames.push(data);
        self
    }

    /// Append several video frames.
    pub fn frames(mut self, frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.frames.extend(frames);
        self
    }

    /// Append a zero-length (dropped) video frame.
    pub fn dropped_frame(mut self) -> Self {
        self.frames.push(Vec::new());
        self
    }

    /// Set how `idx1` is written.
    pub fn index_mode(mut self, mode: IndexMode) -> Self {
        self.index_mode = mode;
        self
    }

    /// Interleave an audio stream (stream 1) after every video chunk.
    pub fn with_audio(mut self) -> Self {
        self.with_audio = true;
        self
    }

    /// Declare only an audio stream in the headers.
    pub fn audio_only(mut self) -> Self {
        self.audio_only = true;
        self
    }

    /// Override the video `strh` scale and rate.
    pub fn strh_rate(mut self, scale: u32, rate: u32) -> Self {
        self.strh_rate = Some((scale, rate));
        self
    }

    /// Serialize the AVI file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (scale, rate) = self.strh_rate.unwrap_or((1, self.fps));

        let mut streams = Vec::new();
        if !self.audio_only {
            streams.push(list(
                b"strl",
                &[
                    chunk(b"strh", &stream_header(b"vids", b"MJPG", scale, rate, self.frames.len() as u32)),
                    chunk(b"strf", &bitmap_info()),
                ]
                .concat(),
            ));
        }
        if self.with_audio || self.audio_only {
            streams.push(list(
                b"strl",
                &[
                    chunk(b"strh", &stream_header(b"auds", &[0; 4], 1, 8000, 0)),
                    chunk(b"strf", &[0u8; 16]),
                ]
                .concat(),
            ));
        }

        let mut avih = vec![0u8; 56];
        let usec = if self.fps > 0 { 1_000_000 / self.fps } else { 0 };
        put_u32(&mut avih, 0, usec);
        put_u32(&mut avih, 16, self.frames.len() as u32);
        put_u32(&mut avih, 24, streams.len() as u32);
        put_u32(&mut avih, 32, 640);
        put_u32(&mut avih, 36, 480);

        let hdrl = list(b"hdrl", &[chunk(b"avih", &avih), streams.concat()].concat());

        // movi children, with idx1 entries relative to the movi form type
        let mut movi_body = Vec::new();
        let mut entries: Vec<([u8; 4], u32, u32)> = Vec::new();
        for frame in &self.frames {
            entries.push((*b"00dc", 4 + movi_body.len() as u32, frame.len() as u32));
            movi_body.extend_from_slice(&chunk(b"00dc", frame));
            if self.with_audio {
                let audio = [0x80u8; 7];
                entries.push((*b"01wb", 4 + movi_body.len() as u32, audio.len() as u32));
                movi_body.extend_from_slice(&chunk(b"01wb", &audio));
            }
        }
        let movi = list(b"movi", &movi_body);

        // 'movi' form type sits after RIFF header, hdrl and the LIST header
        let movi_base = (12 + hdrl.len() + 8) as u32;

        let idx1 = match self.index_mode {
            IndexMode::None => Vec::new(),
            mode => {
                let mut data = Vec::with_capacity(entries.len() * 16);
                for (id, offset, size) in &entries {
                    let offset = if mode == IndexMode::Absolute {
                        offset + movi_base
                    } else {
                        *offset
                    };
                    data.extend_from_slice(id);
                    data.extend_from_slice(&0x10u32.to_le_bytes());
                    data.extend_from_slice(&offset.to_le_bytes());
                    data.extend_from_slice(&size.to_le_bytes());
                }
                chunk(b"idx1", &data)
            }
        };

        let content = [hdrl, movi, idx1].concat();
        let mut out = Vec::with_capacity(content.len() + 12);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(content.len() as u32 + 4).to_le_bytes());
        out.extend_from_slice(b"AVI ");
        out.extend_from_slice(&content);
        out
    }

    /// Write the AVI file to `path`.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }
}

fn chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 9);
    out.extend_from_slice(id);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn list(form: &[u8; 4], children: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(children.len() + 12);
    out.extend_from_slice(b"LIST");
    out.extend_from_slice(&(children.len() as u32 + 4).to_le_bytes());
    out.extend_from_slice(form);
    out.extend_from_slice(children);
    out
}

fn stream_header(kind: &[u8; 4], handler: &[u8; 4], scale: u32, rate: u32, length: u32) -> Vec<u8> {
    let mut data = vec![0u8; 56];
    data[..4].copy_from_slice(kind);
    data[4..8].copy_from_slice(handler);
    put_u32(&mut data, 20, scale);
    put_u32(&mut data, 24, rate);
    put_u32(&mut data, 32, length);
    data
}

fn bitmap_info() -> Vec<u8> {
    let mut data = vec![0u8; 40];
    put_u32(&mut data, 0, 40);
    put_u32(&mut data, 4, 640);
    put_u32(&mut data, 8, 480);
    data[12] = 1;
    data[14] = 24;
    data[16..20].copy_from_slice(b"MJPG");
    data
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}
