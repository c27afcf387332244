//! Core type definitions shared by the media and index crates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::paths::{AVI_EXTENSIONS, MJPEG_EXTENSIONS};

/// Container format of a segment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// RIFF AVI with MJPEG video chunks.
    Avi,
    /// Raw concatenated JPEG images.
    Mjpeg,
}

impl FormatKind {
    /// File extensions recognized for this format (lowercase, no dot).
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Avi => AVI_EXTENSIONS,
            Self::Mjpeg => MJPEG_EXTENSIONS,
        }
    }

    /// Short lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avi => "avi",
            Self::Mjpeg => "mjpeg",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of travel along the frame timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_kind_serialization() {
        assert_eq!(serde_json::to_string(&FormatKind::Avi).unwrap(), "\"avi\"");
        assert_eq!(
            serde_json::from_str::<FormatKind>("\"mjpeg\"").unwrap(),
            FormatKind::Mjpeg
        );
    }

    #[test]
    fn test_format_kind_extensions() {
        assert!(FormatKind::Avi.extensions().contains(&"avi"));
        assert!(FormatKind::Mjpeg.extensions().contains(&"mjpg"));
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Forward.to_string(), "forward");
        assert_eq!(Direction::Backward.to_string(), "backward");
    }
}
