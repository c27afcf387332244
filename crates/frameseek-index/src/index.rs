//! The segmented frame index.
//!
//! Presents the ordered segment files of one directory as a single frame
//! timeline. Segments are discovered and opened once per `load`; afterwards
//! every lookup works on in-memory frame tables and a precomputed table of
//! cumulative frame counts.

use frameseek_common::{paths::ordering_key, Direction};
use frameseek_media::{Segment, SegmentFormat};
use std::path::{Path, PathBuf};

use crate::config::{IndexConfig, OutOfOrderPolicy};
use crate::cursor::Cursor;
use crate::decoder::FrameDecoder;
use crate::descriptor::{LoadReport, SegmentDescriptor, SkipReason, SkippedFile};
use crate::discovery;
use crate::error::{Error, Result, SeekTarget};
use crate::frame::VideoFrame;

/// Frame index over the segments of one format.
#[derive(Debug, Clone)]
pub struct SegmentedFrameIndex<F> {
    format: F,
    config: IndexConfig,
    root: Option<PathBuf>,
    segments: Vec<Segment>,
    /// Per segment: timestamps never decrease, so binary search is valid.
    monotonic: Vec<bool>,
    /// Global number of each segment's first frame.
    segment_starts: Vec<u32>,
    total_frames: u32,
    frame_rate: u32,
    /// Smallest and largest timestamp on the timeline.
    span: Option<(i64, i64)>,
    cursor: Cursor,
    report: LoadReport,
}

impl<F: SegmentFormat> SegmentedFrameIndex<F> {
    /// Create an empty index; call [`FrameDecoder::load`] to populate it.
    pub fn new(format: F, config: IndexConfig) -> Self {
        let frame_rate = config.default_frame_rate;
        Self {
            format,
            config,
            root: None,
            segments: Vec::new(),
            monotonic: Vec::new(),
            segment_starts: Vec::new(),
            total_frames: 0,
            frame_rate,
            span: None,
            cursor: Cursor::default(),
            report: LoadReport::default(),
        }
    }

    /// Build an index over already opened segments, in timeline order.
    ///
    /// Segments go through the same stitching and validation as during
    /// [`FrameDecoder::load`].
    pub fn from_segments(format: F, config: IndexConfig, segments: Vec<Segment>) -> Self {
        let mut index = Self::new(format, config);
        let keyed = segments
            .into_iter()
            .map(|segment| (segment.path().to_string_lossy().into_owned(), segment))
            .collect();
        index.assemble(keyed, Vec::new());
        index
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Directory of the last successful load.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Retained segments in timeline order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// What the last load kept and skipped.
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Map a global frame number to `(segment_index, local_frame_index)`.
    pub fn locate(&self, number: u32) -> Option<(usize, u32)> {
        if number >= self.total_frames {
            return None;
        }
        let segment = self.segment_starts.partition_point(|&start| start <= number) - 1;
        Some((segment, number - self.segment_starts[segment]))
    }

    /// Cursor positioned on global frame `number`.
    pub fn cursor_at(&self, number: u32) -> Option<Cursor> {
        let (segment, local) = self.locate(number)?;
        let timestamp = self.segments[segment].frame_timestamp(local)?;
        Some(Cursor {
            global_frame_number: number,
            segment_index: segment as u32,
            local_frame_index: local,
            timestamp,
        })
    }

    /// Frame with global number `number`, without moving the cursor.
    pub fn frame_at(&self, number: u32) -> Option<VideoFrame> {
        let (segment, local) = self.locate(number)?;
        self.frame(segment, local, number)
    }

    /// Every frame in global order. Does not touch the cursor.
    pub fn frames(&self) -> impl Iterator<Item = VideoFrame> + '_ {
        self.segments
            .iter()
            .enumerate()
            .flat_map(move |(segment, s)| {
                let start = self.segment_starts[segment];
                (0..s.frame_count()).filter_map(move |local| self.frame(segment, local, start + local))
            })
    }

    fn frame(&self, segment: usize, local: u32, number: u32) -> Option<VideoFrame> {
        let s = self.segments.get(segment)?;
        Some(VideoFrame {
            number,
            timestamp: s.frame_timestamp(local)?,
            payload: s.frame_payload(local)?,
        })
    }

    /// Replace all state with `opened` segments (ordering key, segment).
    fn assemble(&mut self, opened: Vec<(String, Segment)>, mut skipped: Vec<SkippedFile>) {
        let policy = self.config.out_of_order;

        self.segments.clear();
        self.monotonic.clear();
        self.segment_starts.clear();
        self.total_frames = 0;
        self.span = None;

        let mut descriptors = Vec::with_capacity(opened.len());
        // Latest timestamp of the previous retained segment and its frame spacing
        let mut previous: Option<(i64, i64)> = None;

        for (key, mut segment) in opened {
            if segment.frame_count() == 0 {
                tracing::info!(path = %segment.path().display(), "Skipping segment without frames");
                skipped.push(SkippedFile {
                    path: segment.path().to_path_buf(),
                    reason: SkipReason::Empty,
                });
                continue;
            }

            if !segment.is_anchored() {
                let start = previous.map_or(0, |(end, interval)| end.saturating_add(interval));
                segment.rebase(start);
            }

            let monotonic = segment.frames().is_monotonic();
            if !monotonic {
                tracing::warn!(
                    path = %segment.path().display(),
                    policy = %policy,
                    "Segment timestamps are out of order"
                );
                if policy == OutOfOrderPolicy::Reject {
                    skipped.push(SkippedFile {
                        path: segment.path().to_path_buf(),
                        reason: SkipReason::NonMonotonic,
                    });
                    continue;
                }
            }

            if let Some((previous_end, _)) = previous {
                if segment.start_time() < previous_end {
                    tracing::warn!(
                        path = %segment.path().display(),
                        start = segment.start_time(),
                        previous_end,
                        policy = %policy,
                        "Segment starts before the previous one ends"
                    );
                    if policy == OutOfOrderPolicy::Reject {
                        skipped.push(SkippedFile {
                            path: segment.path().to_path_buf(),
                            reason: SkipReason::Overlapping,
                        });
                        continue;
                    }
                }
            }

            let Some(total) = self.total_frames.checked_add(segment.frame_count()) else {
                tracing::warn!(
                    path = %segment.path().display(),
                    "Frame count exceeds addressable range, ignoring remaining segments"
                );
                break;
            };

            let mut latest = segment.start_time();
            for ts in segment.frames().iter().map(|f| f.timestamp) {
                latest = latest.max(ts);
                self.span = Some(match self.span {
                    Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
                    None => (ts, ts),
                });
            }

            previous = Some((latest, segment.frame_interval()));
            descriptors.push(SegmentDescriptor::describe(&segment, key, monotonic));
            self.segment_starts.push(self.total_frames);
            self.total_frames = total;
            self.monotonic.push(monotonic);
            self.segments.push(segment);
        }

        let mut degenerate = false;
        self.frame_rate = match mean_rate(&self.segments) {
            Some(rate) if rate > 0 => rate,
            _ => {
                degenerate = true;
                tracing::warn!(
                    default_frame_rate = self.config.default_frame_rate,
                    segments = self.segments.len(),
                    "Average frame rate is not positive, using default"
                );
                self.config.default_frame_rate
            }
        };

        self.cursor = self.cursor_at(0).unwrap_or_default();
        self.report = LoadReport {
            segments: descriptors,
            skipped,
            degenerate_frame_rate: degenerate,
        };

        if self.segments.is_empty() {
            tracing::info!("Frame index is empty");
        }
    }
}

/// Rounded arithmetic mean of segment frame rates.
fn mean_rate(segments: &[Segment]) -> Option<u32> {
    if segments.is_empty() {
        return None;
    }
    let sum: u64 = segments.iter().map(|s| s.frame_rate() as u64).sum();
    Some((sum as f64 / segments.len() as f64).round() as u32)
}

impl<F: SegmentFormat> FrameDecoder for SegmentedFrameIndex<F> {
    fn name(&self) -> &'static str {
        self.format.name()
    }

    fn can_handle(&self, dir: &Path) -> bool {
        discovery::has_candidates(dir, self.format.kind().extensions(), &self.config)
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }

        let candidates = discovery::discover(dir, self.format.kind().extensions(), &self.config);
        tracing::debug!(
            dir = %dir.display(),
            format = self.format.name(),
            candidates = candidates.len(),
            "Discovered segment candidates"
        );

        let mut opened = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();
        for path in candidates {
            match self.format.open(&path) {
                Ok(segment) => opened.push((ordering_key(dir, &path), segment)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to open segment, skipping");
                    skipped.push(SkippedFile {
                        path,
                        reason: SkipReason::OpenFailed(e.to_string()),
                    });
                }
            }
        }

        self.assemble(opened, skipped);
        self.root = Some(dir.to_path_buf());

        tracing::info!(
            dir = %dir.display(),
            segments = self.segments.len(),
            skipped = self.report.skipped.len(),
            frames = self.total_frames,
            frame_rate = self.frame_rate,
            "Loaded frame index"
        );
        Ok(())
    }

    fn frame_count(&self) -> u32 {
        self.total_frames
    }

    fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        if self.total_frames == 0 {
            return None;
        }
        self.frame(
            self.cursor.segment_index as usize,
            self.cursor.local_frame_index,
            self.cursor.global_frame_number,
        )
    }

    fn seek_to_time(&mut self, timestamp: i64) -> Result<()> {
        let cursor = self
            .frame_number_for_time(timestamp)
            .and_then(|number| self.cursor_at(number))
            .ok_or(Error::SeekOutOfRange(SeekTarget::Time(timestamp)))?;
        tracing::trace!(timestamp, frame = cursor.global_frame_number, "Seek to time");
        self.cursor = cursor;
        Ok(())
    }

    fn seek_to_frame(&mut self, number: u32) -> Result<()> {
        let cursor = self
            .cursor_at(number)
            .ok_or(Error::SeekOutOfRange(SeekTarget::Frame(number)))?;
        tracing::trace!(frame = number, "Seek to frame");
        self.cursor = cursor;
        Ok(())
    }

    fn frame_number_for_time(&self, timestamp: i64) -> Option<u32> {
        let (lo, hi) = self.span?;
        if timestamp < lo || timestamp > hi {
            return None;
        }

        // Strictly smaller delta wins, so ties stay with the earlier frame
        let mut best: Option<(u32, u64)> = None;
        for (i, segment) in self.segments.iter().enumerate() {
            let frames = segment.frames();
            let local = if self.monotonic[i] {
                frames.nearest_sorted(timestamp)
            } else {
                frames.nearest_linear(timestamp)
            };
            let Some(local) = local else { continue };
            let Some(entry) = frames.get(local) else { continue };

            let delta = entry.timestamp.abs_diff(timestamp);
            if best.map_or(true, |(_, d)| delta < d) {
                best = Some((self.segment_starts[i] + local, delta));
            }
        }
        best.map(|(number, _)| number)
    }

    fn has_next(&self) -> bool {
        self.total_frames > 0 && self.cursor.global_frame_number < self.total_frames - 1
    }

    fn next(&mut self) -> Result<VideoFrame> {
        let position = self.cursor.global_frame_number;
        let boundary = Error::IterationBoundaryExceeded {
            direction: Direction::Forward,
            position,
        };
        if !self.has_next() {
            tracing::error!(position, frames = self.total_frames, "next() called past the last frame");
            return Err(boundary);
        }

        let frame = self.current_frame().ok_or(boundary)?;
        if let Some(cursor) = self.cursor_at(position + 1) {
            self.cursor = cursor;
        }
        Ok(frame)
    }

    fn has_previous(&self) -> bool {
        self.total_frames > 0 && !self.cursor.is_at_start()
    }

    fn previous(&mut self) -> Result<VideoFrame> {
        let position = self.cursor.global_frame_number;
        let boundary = Error::IterationBoundaryExceeded {
            direction: Direction::Backward,
            position,
        };
        if !self.has_previous() {
            tracing::error!(position, "previous() called at the first frame");
            return Err(boundary);
        }

        let frame = self.current_frame().ok_or(boundary)?;
        if let Some(cursor) = self.cursor_at(position - 1) {
            self.cursor = cursor;
        }
        Ok(frame)
    }
}
