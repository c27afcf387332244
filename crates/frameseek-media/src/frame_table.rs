//! Per-segment frame tables.
//!
//! A frame table lists every exposed frame of one segment in stream order:
//! - timestamp (epoch milliseconds once the segment is anchored)
//! - byte offset and size of the encoded payload within the file

/// A resolved frame entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameEntry {
    /// Frame index within the segment (0-based).
    pub index: u32,
    /// Presentation timestamp in milliseconds.
    pub timestamp: i64,
    /// File offset where the payload starts.
    pub offset: u64,
    /// Payload size in bytes.
    pub size: u32,
}

/// Ordered frames of one segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameTable {
    frames: Vec<FrameEntry>,
}

impl FrameTable {
    /// Build a table from `(timestamp, offset, size)` triples, in order.
    pub fn from_triples<I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (i64, u64, u32)>,
    {
        let frames = triples
            .into_iter()
            .enumerate()
            .map(|(i, (timestamp, offset, size))| FrameEntry {
                index: i as u32,
                timestamp,
                offset,
                size,
            })
            .collect();
        Self { frames }
    }

    /// Build a table of payload-less frames from timestamps alone.
    pub fn from_timestamps(timestamps: &[i64]) -> Self {
        Self::from_triples(timestamps.iter().map(|&ts| (ts, 0, 0)))
    }

    /// Number of frames.
    pub fn len(&self) -> u32 {
        self.frames.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get frame by index.
    pub fn get(&self, index: u32) -> Option<&FrameEntry> {
        self.frames.get(index as usize)
    }

    /// Iterate over all frames.
    pub fn iter(&self) -> impl Iterator<Item = &FrameEntry> {
        self.frames.iter()
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.frames.first().map(|f| f.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.frames.last().map(|f| f.timestamp)
    }

    /// True when timestamps never decrease from one frame to the next.
    pub fn is_monotonic(&self) -> bool {
        self.frames
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    }

    /// Mean spacing between consecutive frames, in milliseconds.
    ///
    /// Returns `None` with fewer than two frames.
    pub fn mean_interval(&self) -> Option<i64> {
        let (first, last) = (self.first_timestamp()?, self.last_timestamp()?);
        let gaps = self.frames.len().checked_sub(1).filter(|&n| n > 0)? as i64;
        Some((last - first) / gaps)
    }

    /// Add `delta` milliseconds to every timestamp.
    pub fn shift(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        for frame in &mut self.frames {
            frame.timestamp = frame.timestamp.saturating_add(delta);
        }
    }

    /// Index of the frame whose timestamp is closest to `timestamp`.
    ///
    /// Binary search; only valid when [`is_monotonic`](Self::is_monotonic)
    /// holds. Ties go to the earliest frame.
    pub fn nearest_sorted(&self, timestamp: i64) -> Option<u32> {
        if self.frames.is_empty() {
            return None;
        }

        let upper = self.frames.partition_point(|f| f.timestamp < timestamp);
        let best_ts = match (upper.checked_sub(1), self.frames.get(upper)) {
            (Some(below), Some(above)) => {
                let below_ts = self.frames[below].timestamp;
                if timestamp.abs_diff(below_ts) <= above.timestamp.abs_diff(timestamp) {
                    below_ts
                } else {
                    above.timestamp
                }
            }
            (Some(below), None) => self.frames[below].timestamp,
            (None, Some(above)) => above.timestamp,
            (None, None) => return None,
        };

        // First of any run of equal timestamps
        Some(self.frames.partition_point(|f| f.timestamp < best_ts) as u32)
    }

    /// Index of the frame whose timestamp is closest to `timestamp`.
    ///
    /// Exhaustive scan; correct for any ordering. Ties go to the earliest frame.
    pub fn nearest_linear(&self, timestamp: i64) -> Option<u32> {
        let mut best: Option<(u32, u64)> = None;
        for frame in &self.frames {
            let delta = frame.timestamp.abs_diff(timestamp);
            if best.map_or(true, |(_, d)| delta < d) {
                best = Some((frame.index, delta));
            }
        }
        best.map(|(index, _)| index)
    }
}
