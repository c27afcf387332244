mod cli;

use frameseek::{
    config,
    output::{FrameView, InspectView, SeekView},
};
use frameseek_index::{Decoder, DecoderFactory, FrameDecoder};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Target};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "frameseek=trace,frameseek_index=trace,frameseek_media=debug".to_string()
        } else {
            "frameseek=info,frameseek_index=info,frameseek_media=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Inspect { dir, json } => inspect(&dir, config_path, json),
        Commands::Seek { dir, target, json } => seek(&dir, config_path, target, json),
        Commands::Frames {
            dir,
            start,
            limit,
            reverse,
            json,
        } => list_frames(&dir, config_path, start, limit, reverse, json),
        Commands::Extract {
            dir,
            target,
            output,
        } => extract(&dir, config_path, target, &output),
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or_else(|| cli.config.clone());
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("frameseek {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load `dir` with the first decoder that recognizes its files.
fn open_decoder(dir: &Path, config_path: Option<&Path>) -> Result<Decoder> {
    let config = config::load_config_or_default(config_path)?;
    let factory = DecoderFactory::new(config.index);

    factory
        .create_decoder(dir)
        .with_context(|| format!("Failed to load segments from {:?}", dir))?
        .with_context(|| format!("No AVI or MJPEG segments found in {:?}", dir))
}

fn seek_target(decoder: &mut Decoder, target: Target) -> Result<()> {
    match (target.frame, target.time) {
        (Some(number), _) => decoder.seek_to_frame(number)?,
        (None, Some(timestamp)) => decoder.seek_to_time(timestamp)?,
        (None, None) => anyhow::bail!("Either --frame or --time is required"),
    }
    Ok(())
}

fn inspect(dir: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let decoder = open_decoder(dir, config_path)?;
    let view = InspectView::new(dir, &decoder);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.render());
    }
    Ok(())
}

fn seek(dir: &Path, config_path: Option<&Path>, target: Target, json: bool) -> Result<()> {
    let mut decoder = open_decoder(dir, config_path)?;
    seek_target(&mut decoder, target)?;

    let frame = decoder
        .current_frame()
        .context("Index has no frame under the cursor")?;
    let view = SeekView {
        cursor: decoder.cursor(),
        frame: FrameView::from(&frame),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.render());
    }
    Ok(())
}

fn list_frames(
    dir: &Path,
    config_path: Option<&Path>,
    start: Option<u32>,
    limit: Option<usize>,
    reverse: bool,
    json: bool,
) -> Result<()> {
    let mut decoder = open_decoder(dir, config_path)?;
    let total = decoder.frame_count();

    let mut frames = Vec::new();
    if total > 0 {
        let start = start.unwrap_or(if reverse { total - 1 } else { 0 });
        decoder.seek_to_frame(start)?;

        let limit = limit.unwrap_or(usize::MAX);
        while frames.len() < limit {
            let more = if reverse {
                decoder.has_previous()
            } else {
                decoder.has_next()
            };
            if !more {
                // The cursor rests on the final frame in this direction
                frames.extend(decoder.current_frame());
                break;
            }
            let frame = if reverse {
                decoder.previous()?
            } else {
                decoder.next()?
            };
            frames.push(frame);
        }
    }

    let views: Vec<FrameView> = frames.iter().map(FrameView::from).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        for view in &views {
            println!("{}", view.to_line());
        }
    }
    Ok(())
}

fn extract(dir: &Path, config_path: Option<&Path>, target: Target, output: &Path) -> Result<()> {
    let mut decoder = open_decoder(dir, config_path)?;
    seek_target(&mut decoder, target)?;

    let frame = decoder
        .current_frame()
        .context("Index has no frame under the cursor")?;
    let data = frame
        .payload
        .read()
        .with_context(|| format!("Failed to read frame {} from {:?}", frame.number, frame.payload.path))?;

    std::fs::write(output, &data).with_context(|| format!("Failed to write {:?}", output))?;

    tracing::info!(frame = frame.number, bytes = data.len(), "Extracted frame");
    println!(
        "Wrote frame {} ({} bytes) to {}",
        frame.number,
        data.len(),
        output.display()
    );
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let index = &config.index;
    println!("  Default frame rate: {}", index.default_frame_rate);
    println!("  MJPEG frame rate: {}", index.mjpeg_rate());
    match index.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }
    match index.max_files {
        Some(files) => println!("  Max files: {}", files),
        None => println!("  Max files: unlimited"),
    }
    println!("  Follow links: {}", index.follow_links);
    println!("  Out-of-order segments: {}", index.out_of_order);

    Ok(())
}
