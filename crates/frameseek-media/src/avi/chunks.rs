//! RIFF chunk definitions and AVI header structures.

/// Four-character chunk code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub const RIFF: Self = Self(*b"RIFF");
    pub const LIST: Self = Self(*b"LIST");
    pub const AVI: Self = Self(*b"AVI ");
    pub const AVIX: Self = Self(*b"AVIX");
    pub const HDRL: Self = Self(*b"hdrl");
    pub const AVIH: Self = Self(*b"avih");
    pub const STRL: Self = Self(*b"strl");
    pub const STRH: Self = Self(*b"strh");
    pub const MOVI: Self = Self(*b"movi");
    pub const REC: Self = Self(*b"rec ");
    pub const IDX1: Self = Self(*b"idx1");

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the 4-char code as a string.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// Compressed (`NNdc`) and uncompressed (`NNdb`) video chunk ids of a stream.
    pub fn video_chunks(stream: u32) -> [Self; 2] {
        let tens = b'0' + ((stream / 10) % 10) as u8;
        let ones = b'0' + (stream % 10) as u8;
        [
            Self([tens, ones, b'd', b'c']),
            Self([tens, ones, b'd', b'b']),
        ]
    }

    /// True for chunk ids that carry sub-chunks after a form type.
    pub fn is_list(&self) -> bool {
        *self == Self::RIFF || *self == Self::LIST
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed chunk header.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk id.
    pub id: ChunkId,
    /// Form type for RIFF/LIST chunks.
    pub list_type: Option<ChunkId>,
    /// File offset where chunk data starts (after the form type for lists).
    pub data_offset: u64,
    /// Size of the chunk data, clamped to the enclosing range.
    pub data_size: u64,
}

impl Chunk {
    /// Offset one past the last data byte.
    pub fn data_end(&self) -> u64 {
        self.data_offset + self.data_size
    }

    /// Check if this is a list of the given form type.
    pub fn is_list_of(&self, form: ChunkId) -> bool {
        self.id.is_list() && self.list_type == Some(form)
    }
}

/// Stream type from the `strh` fccType field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Video,
    Audio,
    Midi,
    Text,
    Unknown([u8; 4]),
}

impl StreamType {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        match &bytes {
            b"vids" => Self::Video,
            b"auds" => Self::Audio,
            b"mids" => Self::Midi,
            b"txts" => Self::Text,
            _ => Self::Unknown(bytes),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }
}

/// Fields of the `avih` main header used for indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MainHeader {
    /// Frame period in microseconds.
    pub micro_sec_per_frame: u32,
}

impl MainHeader {
    /// Size of the fixed `avih` payload.
    pub const SIZE: usize = 56;

    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 40 {
            return None;
        }
        Some(Self {
            micro_sec_per_frame: le_u32(data, 0),
        })
    }
}

/// Fields of a `strh` stream header used for indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub stream_type: StreamType,
    /// Codec fourcc (`MJPG` for Motion JPEG).
    pub handler: [u8; 4],
    pub scale: u32,
    pub rate: u32,
    /// Stream length in `scale` units (frames for video).
    pub length: u32,
}

impl StreamHeader {
    /// Size of the fixed `strh` payload.
    pub const SIZE: usize = 56;

    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 36 {
            return None;
        }
        Some(Self {
            stream_type: StreamType::from_bytes([data[0], data[1], data[2], data[3]]),
            handler: [data[4], data[5], data[6], data[7]],
            scale: le_u32(data, 20),
            rate: le_u32(data, 24),
            length: le_u32(data, 32),
        })
    }

    /// Frames per second as declared by rate/scale.
    pub fn fps(&self) -> Option<f64> {
        if self.scale == 0 || self.rate == 0 {
            None
        } else {
            Some(self.rate as f64 / self.scale as f64)
        }
    }
}

pub(crate) fn le_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}
