use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "frameseek")]
#[command(author, version, about = "Frame-accurate navigation over directories of video segments")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// A frame addressed by number or by time.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = true, multiple = false)]
pub struct Target {
    /// Global frame number (0-based)
    #[arg(long)]
    pub frame: Option<u32>,

    /// Timestamp in milliseconds; the nearest frame is used
    #[arg(long, allow_negative_numbers = true)]
    pub time: Option<i64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a segment directory and summarize its timeline
    Inspect {
        /// Directory holding the segments
        #[arg(required = true)]
        dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a frame number or timestamp to a frame
    Seek {
        /// Directory holding the segments
        #[arg(required = true)]
        dir: PathBuf,

        #[command(flatten)]
        target: Target,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List frames in timeline order
    Frames {
        /// Directory holding the segments
        #[arg(required = true)]
        dir: PathBuf,

        /// First frame to list (default: first, or last with --reverse)
        #[arg(long)]
        start: Option<u32>,

        /// Maximum number of frames to list
        #[arg(long)]
        limit: Option<usize>,

        /// Walk backwards
        #[arg(long)]
        reverse: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the encoded bytes of one frame to a file
    Extract {
        /// Directory holding the segments
        #[arg(required = true)]
        dir: PathBuf,

        #[command(flatten)]
        target: Target,

        /// Output file
        #[arg(short, long, required = true)]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
