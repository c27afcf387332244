//! Frame snapshots handed to callers.

use frameseek_media::FramePayload;

/// One frame of the global timeline.
///
/// Built fresh for every navigation call; holding one never pins the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoFrame {
    /// Global frame number.
    pub number: u32,
    /// Timestamp in milliseconds.
    pub timestamp: i64,
    /// Location of the encoded frame bytes.
    pub payload: FramePayload,
}
