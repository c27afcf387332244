//! Frameseek-Index: one seekable frame timeline over a directory of segments
//!
//! A directory of ordered segment files (AVI or raw MJPEG) is presented as a
//! single sequence of frames that can be addressed by global frame number or
//! by timestamp, and walked forwards or backwards.
//!
//! # Example
//!
//! ```no_run
//! use frameseek_index::{DecoderFactory, FrameDecoder, IndexConfig};
//! use std::path::Path;
//!
//! let factory = DecoderFactory::new(IndexConfig::default());
//! if let Some(mut decoder) = factory.create_decoder(Path::new("/data/camera"))? {
//!     decoder.seek_to_time(1_589_452_200_000)?;
//!     while decoder.has_next() {
//!         let frame = decoder.next()?;
//!         println!("{} @ {}", frame.number, frame.timestamp);
//!     }
//! }
//! # Ok::<(), frameseek_index::Error>(())
//! ```

pub mod config;
pub mod cursor;
pub mod decoder;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod factory;
pub mod frame;
pub mod index;

pub use config::{IndexConfig, OutOfOrderPolicy, DEFAULT_FRAME_RATE};
pub use cursor::Cursor;
pub use decoder::FrameDecoder;
pub use descriptor::{LoadReport, SegmentDescriptor, SkipReason, SkippedFile};
pub use error::{Error, Result, SeekTarget};
pub use factory::{Decoder, DecoderFactory, DecoderKind};
pub use frame::VideoFrame;
pub use index::SegmentedFrameIndex;
