//! Frameseek-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across frameseek:
//!
//! - **Core Types**: segment format kinds and navigation directions
//! - **Path Utilities**: extension matching for segment files
//! - **Time Utilities**: segment start times encoded in file names, RFC 3339 rendering
//!
//! # Examples
//!
//! ```
//! use frameseek_common::{paths::has_extension, time::start_time_from_path, FormatKind};
//! use std::path::Path;
//!
//! let path = Path::new("video/1589452800123.avi");
//! assert!(has_extension(path, FormatKind::Avi.extensions()));
//! assert_eq!(start_time_from_path(path), Some(1_589_452_800_123));
//! ```

pub mod paths;
pub mod time;
pub mod types;

pub use types::*;
