//! Error types for frameseek-index.

use frameseek_common::Direction;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for frameseek-index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What a failed seek was aiming at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekTarget {
    /// Global frame number.
    Frame(u32),
    /// Timestamp in milliseconds.
    Time(i64),
}

impl fmt::Display for SeekTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(n) => write!(f, "frame {n}"),
            Self::Time(ts) => write!(f, "time {ts}ms"),
        }
    }
}

/// Error type for frameseek-index operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The seek target does not resolve to a frame. The cursor did not move.
    #[error("Seek out of range: {0}")]
    SeekOutOfRange(SeekTarget),

    /// `next()`/`previous()` called with no frame in that direction.
    #[error("Cannot step {direction} from frame {position}: no more frames")]
    IterationBoundaryExceeded { direction: Direction, position: u32 },

    /// The load target is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Segment parsing error.
    #[error("Media error: {0}")]
    Media(#[from] frameseek_media::Error),
}

impl Error {
    /// True for a seek that found no frame.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::SeekOutOfRange(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::SeekOutOfRange(SeekTarget::Frame(9)).to_string(),
            "Seek out of range: frame 9"
        );
        assert_eq!(
            Error::SeekOutOfRange(SeekTarget::Time(-5)).to_string(),
            "Seek out of range: time -5ms"
        );
        assert_eq!(
            Error::IterationBoundaryExceeded {
                direction: Direction::Forward,
                position: 4
            }
            .to_string(),
            "Cannot step forward from frame 4: no more frames"
        );
    }

    #[test]
    fn test_media_error_conversion() {
        let err = Error::from(frameseek_media::Error::NoVideoStream);
        assert!(matches!(err, Error::Media(_)));
        assert!(!err.is_out_of_range());
    }
}
