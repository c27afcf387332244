//! Navigation cursor.

/// Position on the global frame timeline.
///
/// `global_frame_number` always equals the frame count of every segment
/// before `segment_index` plus `local_frame_index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Cursor {
    pub global_frame_number: u32,
    pub segment_index: u32,
    pub local_frame_index: u32,
    /// Timestamp of the frame under the cursor, in milliseconds.
    pub timestamp: i64,
}

impl Cursor {
    /// True at the very first frame.
    pub fn is_at_start(&self) -> bool {
        self.segment_index == 0 && self.local_frame_index == 0
    }
}
