//! Frameseek - seekable frame timelines over directories of video segments
//!
//! This library crate exposes the CLI's configuration and output rendering
//! for integration testing. The index itself lives in `frameseek-index`.

pub mod config;
pub mod output;
