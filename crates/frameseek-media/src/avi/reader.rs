//! AVI file reader with RIFF chunk parsing.

use super::chunks::{le_u32, Chunk, ChunkId, MainHeader, StreamHeader};
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Maximum allowed chunk data size read into memory (64 MB) to prevent OOM
/// on malformed files. Frame payloads are never read here.
const MAX_CHUNK_DATA_SIZE: u64 = 64 * 1024 * 1024;

/// Size of one `idx1` entry.
const IDX1_ENTRY_SIZE: usize = 16;

/// Parsed AVI structure needed to index the video stream.
#[derive(Debug, Clone)]
pub struct AviFile {
    /// Main `avih` header.
    pub main_header: MainHeader,
    /// Header of the first video stream.
    pub video_header: StreamHeader,
    /// Stream number of the video stream.
    pub video_stream: u32,
    /// Video chunks in stream order as `(data_offset, size)`.
    /// A size of 0 is a dropped frame that still occupies a time slot.
    pub chunks: Vec<(u64, u32)>,
    /// Whether the first movi list was resolved through `idx1`.
    pub indexed: bool,
}

impl AviFile {
    /// Frames per second from the stream header, falling back to `avih`.
    pub fn fps(&self) -> Option<f64> {
        self.video_header.fps().or_else(|| {
            (self.main_header.micro_sec_per_frame > 0)
                .then(|| 1_000_000.0 / self.main_header.micro_sec_per_frame as f64)
        })
    }
}

/// AVI file reader.
pub struct AviReader<R> {
    reader: R,
    file_size: u64,
}

impl<R: Read + Seek> AviReader<R> {
    /// Create a new AVI reader.
    pub fn new(mut reader: R) -> Self {
        let file_size = reader.seek(SeekFrom::End(0)).unwrap_or(0);
        let _ = reader.seek(SeekFrom::Start(0));
        Self { reader, file_size }
    }

    /// Parse the AVI file.
    pub fn parse(&mut self) -> Result<AviFile> {
        let top = self.read_chunks(0, self.file_size)?;
        let riff = top
            .first()
            .ok_or_else(|| Error::invalid_avi("file too short for a RIFF header"))?;
        if !riff.is_list_of(ChunkId::AVI) {
            return Err(Error::invalid_avi(format!(
                "expected RIFF 'AVI ', found {} '{}'",
                riff.id,
                riff.list_type.map(|t| t.to_string()).unwrap_or_default()
            )));
        }

        let body = self.read_chunks(riff.data_offset, riff.data_end())?;

        let hdrl = body
            .iter()
            .find(|c| c.is_list_of(ChunkId::HDRL))
            .ok_or(Error::MissingChunk("hdrl"))?;
        let (main_header, video_stream, video_header) = self.parse_hdrl(hdrl)?;

        let movi = body
            .iter()
            .find(|c| c.is_list_of(ChunkId::MOVI))
            .cloned()
            .ok_or(Error::MissingChunk("movi"))?;

        let ids = ChunkId::video_chunks(video_stream);

        // First RIFF: prefer idx1, fall back to walking movi
        let indexed_chunks = match body.iter().find(|c| c.id == ChunkId::IDX1) {
            Some(idx1) => self.parse_idx1(idx1, &movi, &ids)?,
            None => None,
        };
        let indexed = indexed_chunks.is_some();
        let mut chunks = match indexed_chunks {
            Some(chunks) => chunks,
            None => {
                let mut chunks = Vec::new();
                self.walk_movi(&movi, &ids, &mut chunks)?;
                chunks
            }
        };

        // OpenDML extension RIFFs carry further movi lists and are never in idx1
        for avix in top.iter().skip(1).filter(|c| c.is_list_of(ChunkId::AVIX)) {
            let children = self.read_chunks(avix.data_offset, avix.data_end())?;
            for extra in children.iter().filter(|c| c.is_list_of(ChunkId::MOVI)) {
                self.walk_movi(extra, &ids, &mut chunks)?;
            }
        }

        Ok(AviFile {
            main_header,
            video_header,
            video_stream,
            chunks,
            indexed,
        })
    }

    /// Read chunk headers in `[start, end)`.
    ///
    /// Stops at the first truncated data chunk; list chunks running past
    /// `end` are clamped so their complete children stay reachable.
    fn read_chunks(&mut self, start: u64, end: u64) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut pos = start;

        while pos + 8 <= end {
            self.reader.seek(SeekFrom::Start(pos))?;

            let mut header = [0u8; 8];
            if self.reader.read_exact(&mut header).is_err() {
                break;
            }

            let id = ChunkId::from_bytes([header[0], header[1], header[2], header[3]]);
            let size = le_u32(&header, 4) as u64;
            let padded = size + (size & 1);

            if id.is_list() {
                if size < 4 || pos + 12 > end {
                    break;
                }
                let mut form = [0u8; 4];
                if self.reader.read_exact(&mut form).is_err() {
                    break;
                }
                let data_offset = pos + 12;
                let data_end = (pos + 8 + size).min(end);
                chunks.push(Chunk {
                    id,
                    list_type: Some(ChunkId::from_bytes(form)),
                    data_offset,
                    data_size: data_end - data_offset,
                });
            } else {
                let data_offset = pos + 8;
                if data_offset + size > end {
                    break;
                }
                chunks.push(Chunk {
                    id,
                    list_type: None,
                    data_offset,
                    data_size: size,
                });
            }

            pos += 8 + padded;
        }

        Ok(chunks)
    }

    /// Read and validate chunk data, rejecting oversized chunks.
    fn read_chunk_data(&mut self, chunk: &Chunk) -> Result<Vec<u8>> {
        if chunk.data_size > MAX_CHUNK_DATA_SIZE {
            return Err(Error::invalid_avi(format!(
                "chunk {} data size {} exceeds maximum {}",
                chunk.id, chunk.data_size, MAX_CHUNK_DATA_SIZE
            )));
        }
        self.reader.seek(SeekFrom::Start(chunk.data_offset))?;
        let mut data = vec![0u8; chunk.data_size as usize];
        self.reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// Parse the hdrl list: main header plus the first video stream.
    fn parse_hdrl(&mut self, hdrl: &Chunk) -> Result<(MainHeader, u32, StreamHeader)> {
        let children = self.read_chunks(hdrl.data_offset, hdrl.data_end())?;

        let avih = children
            .iter()
            .find(|c| c.id == ChunkId::AVIH)
            .ok_or(Error::MissingChunk("avih"))?;
        let data = self.read_chunk_data(avih)?;
        let main_header =
            MainHeader::parse(&data).ok_or_else(|| Error::invalid_avi("truncated avih"))?;

        let mut stream = 0u32;
        for strl in children.iter().filter(|c| c.is_list_of(ChunkId::STRL)) {
            let strl_children = self.read_chunks(strl.data_offset, strl.data_end())?;
            if let Some(strh) = strl_children.iter().find(|c| c.id == ChunkId::STRH) {
                let data = self.read_chunk_data(strh)?;
                if let Some(header) = StreamHeader::parse(&data) {
                    if header.stream_type.is_video() {
                        return Ok((main_header, stream, header));
                    }
                }
            }
            stream += 1;
        }

        Err(Error::NoVideoStream)
    }

    /// Resolve video chunks through the legacy `idx1` index.
    ///
    /// `idx1` offsets are relative to the `movi` form type in most files and
    /// absolute in some; the first video entry decides which. Returns `None`
    /// when the index has no usable video entries.
    fn parse_idx1(
        &mut self,
        idx1: &Chunk,
        movi: &Chunk,
        ids: &[ChunkId; 2],
    ) -> Result<Option<Vec<(u64, u32)>>> {
        let data = self.read_chunk_data(idx1)?;

        let entries: Vec<(ChunkId, u64, u32)> = data
            .chunks_exact(IDX1_ENTRY_SIZE)
            .map(|e| {
                let id = ChunkId::from_bytes([e[0], e[1], e[2], e[3]]);
                (id, le_u32(e, 8) as u64, le_u32(e, 12))
            })
            .filter(|(id, _, _)| ids.contains(id))
            .collect();

        let Some(&(first_id, first_offset, _)) = entries.first() else {
            return Ok(None);
        };

        let movi_base = movi.data_offset - 4;
        let bases = if first_offset < movi_base {
            [movi_base, 0]
        } else {
            [0, movi_base]
        };

        let mut base = None;
        for candidate in bases {
            if self.peek_id(candidate + first_offset)? == Some(first_id) {
                base = Some(candidate);
                break;
            }
        }
        let Some(base) = base else {
            tracing::debug!("idx1 offsets do not point at video chunks, walking movi instead");
            return Ok(None);
        };

        let mut chunks = Vec::with_capacity(entries.len());
        for (_, offset, size) in entries {
            let data_offset = base + offset + 8;
            if data_offset + size as u64 > self.file_size {
                tracing::debug!(
                    kept = chunks.len(),
                    "idx1 points past end of file, truncating index"
                );
                break;
            }
            chunks.push((data_offset, size));
        }

        Ok(Some(chunks))
    }

    fn peek_id(&mut self, pos: u64) -> Result<Option<ChunkId>> {
        if pos + 4 > self.file_size {
            return Ok(None);
        }
        self.reader.seek(SeekFrom::Start(pos))?;
        let mut id = [0u8; 4];
        match self.reader.read_exact(&mut id) {
            Ok(()) => Ok(Some(ChunkId::from_bytes(id))),
            Err(_) => Ok(None),
        }
    }

    /// Collect video chunks of a movi list, descending into `rec ` lists.
    fn walk_movi(&mut self, list: &Chunk, ids: &[ChunkId; 2], out: &mut Vec<(u64, u32)>) -> Result<()> {
        let children = self.read_chunks(list.data_offset, list.data_end())?;
        for child in &children {
            if child.is_list_of(ChunkId::REC) {
                self.walk_movi(child, ids, out)?;
            } else if ids.contains(&child.id) {
                out.push((child.data_offset, child.data_size as u32));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_frame, AviFixture, IndexMode};
    use std::io::Cursor;

    fn parse(bytes: Vec<u8>) -> Result<AviFile> {
        AviReader::new(Cursor::new(bytes)).parse()
    }

    fn payloads(bytes: &[u8], avi: &AviFile) -> Vec<Vec<u8>> {
        avi.chunks
            .iter()
            .map(|&(offset, size)| bytes[offset as usize..offset as usize + size as usize].to_vec())
            .collect()
    }

    #[test]
    fn test_relative_idx1() {
        let frames: Vec<_> = (0..4).map(|i| jpeg_frame(i, 32)).collect();
        let bytes = AviFixture::new(25).frames(frames.clone()).to_bytes();

        let avi = parse(bytes.clone()).unwrap();
        assert!(avi.indexed);
        assert_eq!(avi.video_stream, 0);
        assert_eq!(avi.main_header.micro_sec_per_frame, 40_000);
        assert_eq!(avi.fps(), Some(25.0));
        assert_eq!(payloads(&bytes, &avi), frames);
    }

    #[test]
    fn test_absolute_idx1() {
        let frames: Vec<_> = (0..3).map(|i| jpeg_frame(i, 17)).collect();
        let bytes = AviFixture::new(10)
            .frames(frames.clone())
            .index_mode(IndexMode::Absolute)
            .to_bytes();

        let avi = parse(bytes.clone()).unwrap();
        assert!(avi.indexed);
        assert_eq!(payloads(&bytes, &avi), frames);
    }

    #[test]
    fn test_walk_without_idx1() {
        let frames: Vec<_> = (0..3).map(|i| jpeg_frame(i, 9)).collect();
        let bytes = AviFixture::new(10)
            .frames(frames.clone())
            .index_mode(IndexMode::None)
            .to_bytes();

        let avi = parse(bytes.clone()).unwrap();
        assert!(!avi.indexed);
        assert_eq!(payloads(&bytes, &avi), frames);
    }

    #[test]
    fn test_audio_chunks_filtered() {
        let frames: Vec<_> = (0..3).map(|i| jpeg_frame(i, 20)).collect();
        for mode in [IndexMode::Relative, IndexMode::None] {
            let bytes = AviFixture::new(15)
                .frames(frames.clone())
                .with_audio()
                .index_mode(mode)
                .to_bytes();
            let avi = parse(bytes.clone()).unwrap();
            assert_eq!(avi.chunks.len(), 3);
            assert_eq!(payloads(&bytes, &avi), frames);
        }
    }

    #[test]
    fn test_dropped_frames_kept_as_empty_chunks() {
        let bytes = AviFixture::new(10)
            .frame(jpeg_frame(0, 8))
            .dropped_frame()
            .frame(jpeg_frame(1, 8))
            .to_bytes();

        let avi = parse(bytes).unwrap();
        let sizes: Vec<u32> = avi.chunks.iter().map(|&(_, size)| size).collect();
        assert_eq!(sizes.len(), 3);
        assert_eq!(sizes[1], 0);
    }

    #[test]
    fn test_truncated_file_keeps_complete_frames() {
        let frames: Vec<_> = (0..5).map(|i| jpeg_frame(i, 64)).collect();
        let mut bytes = AviFixture::new(10)
            .frames(frames.clone())
            .index_mode(IndexMode::None)
            .to_bytes();
        // Cut into the middle of the last frame
        bytes.truncate(bytes.len() - 20);

        let avi = parse(bytes.clone()).unwrap();
        assert_eq!(avi.chunks.len(), 4);
        assert_eq!(payloads(&bytes, &avi), frames[..4].to_vec());
    }

    #[test]
    fn test_fps_from_avih_when_strh_has_no_rate() {
        let bytes = AviFixture::new(20)
            .frame(jpeg_frame(0, 8))
            .strh_rate(0, 0)
            .to_bytes();
        let avi = parse(bytes).unwrap();
        assert_eq!(avi.video_header.fps(), None);
        assert_eq!(avi.fps(), Some(20.0));
    }

    #[test]
    fn test_not_avi() {
        let err = parse(b"RIFF\x04\x00\x00\x00WAVE".to_vec()).unwrap_err();
        assert!(matches!(err, Error::InvalidAvi(_)));

        let err = parse(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidAvi(_)));
    }

    #[test]
    fn test_missing_video_stream() {
        let bytes = AviFixture::new(10)
            .frame(jpeg_frame(0, 8))
            .audio_only()
            .to_bytes();
        assert!(matches!(parse(bytes), Err(Error::NoVideoStream)));
    }
}
