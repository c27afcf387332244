//! Error types for frameseek-media.

use std::io;
use thiserror::Error;

/// Result type for frameseek-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for frameseek-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid AVI file structure.
    #[error("Invalid AVI: {0}")]
    InvalidAvi(String),

    /// Missing required chunk in AVI file.
    #[error("Missing required chunk: {0}")]
    MissingChunk(&'static str),

    /// The file declares no video stream.
    #[error("No video stream found")]
    NoVideoStream,

    /// Malformed JPEG stream.
    #[error("Invalid JPEG stream: {0}")]
    InvalidJpeg(String),

    /// Unsupported feature or layout.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create an invalid AVI error.
    pub fn invalid_avi(msg: impl Into<String>) -> Self {
        Self::InvalidAvi(msg.into())
    }

    /// Create an invalid JPEG error.
    pub fn invalid_jpeg(msg: impl Into<String>) -> Self {
        Self::InvalidJpeg(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::invalid_avi("bad form type").to_string(),
            "Invalid AVI: bad form type"
        );
        assert_eq!(
            Error::MissingChunk("movi").to_string(),
            "Missing required chunk: movi"
        );
        assert_eq!(Error::NoVideoStream.to_string(), "No video stream found");
    }

    #[test]
    fn test_error_from_io() {
        let err = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(matches!(err, Error::Io(_)));
    }
}
