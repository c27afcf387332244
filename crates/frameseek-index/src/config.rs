//! Index tunables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame rate substituted when the mean segment rate is not positive.
pub const DEFAULT_FRAME_RATE: u32 = 5;

/// What to do with a segment whose timestamps run backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfOrderPolicy {
    /// Keep the segment and log a warning; lookups fall back to a linear scan.
    #[default]
    Warn,
    /// Skip the segment.
    Reject,
}

impl fmt::Display for OutOfOrderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Discovery and timing settings for a [`SegmentedFrameIndex`](crate::SegmentedFrameIndex).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Rate reported when segments carry no usable rate.
    #[serde(default = "default_frame_rate")]
    pub default_frame_rate: u32,

    /// Rate assigned to raw MJPEG streams (default: `default_frame_rate`).
    #[serde(default)]
    pub mjpeg_frame_rate: Option<u32>,

    /// Maximum directory depth scanned (unbounded when unset).
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Maximum number of candidate files considered.
    #[serde(default)]
    pub max_files: Option<usize>,

    /// Follow symbolic links while scanning.
    #[serde(default)]
    pub follow_links: bool,

    #[serde(default)]
    pub out_of_order: OutOfOrderPolicy,
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_frame_rate: default_frame_rate(),
            mjpeg_frame_rate: None,
            max_depth: None,
            max_files: None,
            follow_links: false,
            out_of_order: OutOfOrderPolicy::default(),
        }
    }
}

impl IndexConfig {
    /// Effective rate for raw MJPEG streams.
    pub fn mjpeg_rate(&self) -> u32 {
        self.mjpeg_frame_rate.unwrap_or(self.default_frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.default_frame_rate, 5);
        assert_eq!(config.mjpeg_rate(), 5);
        assert_eq!(config.out_of_order, OutOfOrderPolicy::Warn);
        assert!(!config.follow_links);
    }

    #[test]
    fn test_partial_toml() {
        let config: IndexConfig = toml::from_str(
            r#"
            mjpeg_frame_rate = 12
            out_of_order = "reject"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_frame_rate, 5);
        assert_eq!(config.mjpeg_rate(), 12);
        assert_eq!(config.out_of_order, OutOfOrderPolicy::Reject);
        assert_eq!(config.max_depth, None);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: std::result::Result<IndexConfig, _> = toml::from_str(r#"out_of_order = "ignore""#);
        assert!(result.is_err());
    }
}
