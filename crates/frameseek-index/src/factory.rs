//! Decoder selection.
//!
//! The set of decoders is closed: [`Decoder`] has one variant per segment
//! format and the factory probes them in [`DecoderKind::PRIORITY`] order.

use frameseek_common::FormatKind;
use frameseek_media::{AviFormat, MjpegFormat};
use std::path::Path;

use crate::config::IndexConfig;
use crate::cursor::Cursor;
use crate::decoder::FrameDecoder;
use crate::descriptor::LoadReport;
use crate::error::{Error, Result};
use crate::frame::VideoFrame;
use crate::index::SegmentedFrameIndex;

/// Known decoder variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderKind {
    Avi,
    Mjpeg,
}

impl DecoderKind {
    /// Probe order; the first match wins.
    pub const PRIORITY: [DecoderKind; 2] = [DecoderKind::Avi, DecoderKind::Mjpeg];

    pub fn format(self) -> FormatKind {
        match self {
            Self::Avi => FormatKind::Avi,
            Self::Mjpeg => FormatKind::Mjpeg,
        }
    }
}

impl std::fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.format().as_str())
    }
}

/// A frame index of one of the known formats.
#[derive(Debug, Clone)]
pub enum Decoder {
    Avi(SegmentedFrameIndex<AviFormat>),
    Mjpeg(SegmentedFrameIndex<MjpegFormat>),
}

impl Decoder {
    /// Create an unloaded decoder of `kind`.
    pub fn new(kind: DecoderKind, config: &IndexConfig) -> Self {
        match kind {
            DecoderKind::Avi => Self::Avi(SegmentedFrameIndex::new(
                AviFormat::new(config.default_frame_rate),
                config.clone(),
            )),
            DecoderKind::Mjpeg => Self::Mjpeg(SegmentedFrameIndex::new(
                MjpegFormat::new(config.mjpeg_rate()),
                config.clone(),
            )),
        }
    }

    pub fn kind(&self) -> DecoderKind {
        match self {
            Self::Avi(_) => DecoderKind::Avi,
            Self::Mjpeg(_) => DecoderKind::Mjpeg,
        }
    }

    pub fn report(&self) -> &LoadReport {
        match self {
            Self::Avi(index) => index.report(),
            Self::Mjpeg(index) => index.report(),
        }
    }

    /// Every frame in global order, without moving the cursor.
    pub fn frames(&self) -> Box<dyn Iterator<Item = VideoFrame> + '_> {
        match self {
            Self::Avi(index) => Box::new(index.frames()),
            Self::Mjpeg(index) => Box::new(index.frames()),
        }
    }

    /// Frame with global number `number`, without moving the cursor.
    pub fn frame_at(&self, number: u32) -> Option<VideoFrame> {
        match self {
            Self::Avi(index) => index.frame_at(number),
            Self::Mjpeg(index) => index.frame_at(number),
        }
    }

    fn inner(&self) -> &dyn FrameDecoder {
        match self {
            Self::Avi(index) => index,
            Self::Mjpeg(index) => index,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FrameDecoder {
        match self {
            Self::Avi(index) => index,
            Self::Mjpeg(index) => index,
        }
    }
}

impl FrameDecoder for Decoder {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn can_handle(&self, dir: &Path) -> bool {
        self.inner().can_handle(dir)
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        self.inner_mut().load(dir)
    }

    fn frame_count(&self) -> u32 {
        self.inner().frame_count()
    }

    fn frame_rate(&self) -> u32 {
        self.inner().frame_rate()
    }

    fn cursor(&self) -> Cursor {
        self.inner().cursor()
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        self.inner().current_frame()
    }

    fn seek_to_time(&mut self, timestamp: i64) -> Result<()> {
        self.inner_mut().seek_to_time(timestamp)
    }

    fn seek_to_frame(&mut self, number: u32) -> Result<()> {
        self.inner_mut().seek_to_frame(number)
    }

    fn frame_number_for_time(&self, timestamp: i64) -> Option<u32> {
        self.inner().frame_number_for_time(timestamp)
    }

    fn has_next(&self) -> bool {
        self.inner().has_next()
    }

    fn next(&mut self) -> Result<VideoFrame> {
        self.inner_mut().next()
    }

    fn has_previous(&self) -> bool {
        self.inner().has_previous()
    }

    fn previous(&mut self) -> Result<VideoFrame> {
        self.inner_mut().previous()
    }
}

/// Picks and loads the decoder for a directory.
#[derive(Debug, Clone, Default)]
pub struct DecoderFactory {
    config: IndexConfig,
}

impl DecoderFactory {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// First decoder kind in priority order that can handle `dir`.
    pub fn probe(&self, dir: &Path) -> Option<DecoderKind> {
        DecoderKind::PRIORITY.into_iter().find(|&kind| {
            let handles = Decoder::new(kind, &self.config).can_handle(dir);
            tracing::debug!(decoder = %kind, dir = %dir.display(), handles, "Probing decoder");
            handles
        })
    }

    /// Whether any decoder can handle `dir`. Nothing is loaded.
    pub fn is_decodable(&self, dir: &Path) -> bool {
        self.probe(dir).is_some()
    }

    /// Load `dir` with the first matching decoder.
    ///
    /// `Ok(None)` when no decoder recognizes any file in the directory.
    pub fn create_decoder(&self, dir: &Path) -> Result<Option<Decoder>> {
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }

        let Some(kind) = self.probe(dir) else {
            tracing::info!(dir = %dir.display(), "No decoder can handle directory");
            return Ok(None);
        };

        let mut decoder = Decoder::new(kind, &self.config);
        decoder.load(dir)?;
        tracing::info!(
            decoder = %kind,
            dir = %dir.display(),
            frames = decoder.frame_count(),
            frame_rate = decoder.frame_rate(),
            "Created decoder"
        );
        Ok(Some(decoder))
    }
}
