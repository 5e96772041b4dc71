//! pianokit - Terminal virtual piano
//!
//! Run with: cargo run -- [--mute] [--sequence ASDF]

mod app;
mod audio;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};

use app::PianoKit;

#[derive(Parser)]
#[command(name = "pianokit")]
#[command(about = "Virtual piano kit: play, rebind keys, and replay typed sequences")]
struct Cli {
    /// Run without opening an audio device
    #[arg(long)]
    mute: bool,

    /// Master volume (0.0-1.0)
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Maximum number of overlapping tones
    #[arg(long, default_value_t = 16)]
    voices: usize,

    /// Sequence to pre-fill (unmapped characters are dropped)
    #[arg(long)]
    sequence: Option<String>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    log::info!("pianokit v{}", env!("CARGO_PKG_VERSION"));

    PianoKit::new()
        .muted(cli.mute)
        .volume(cli.volume)
        .voices(cli.voices)
        .sequence(cli.sequence.unwrap_or_default())
        .run()
}

/// Logs go to `path` at `info` by default. Without a file, only what
/// `RUST_LOG` asks for reaches stderr.
fn init_logging(path: Option<&Path>) -> EyreResult<()> {
    let default_filter = if path.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    builder.format_timestamp_millis();

    if let Some(path) = path {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
