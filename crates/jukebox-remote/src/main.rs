//! `jukebox-remote`: a terminal remote control for a jukebox playback server.
//!
//! Features:
//! - mirrors the server's play/pause, mute, volume and current track (polled every second)
//! - lists the playlist; Enter or a mouse click plays a track
//! - Space: play/pause, n/→: next, p/←: previous, m: mute, +/-: volume
//! - s: shuffle, d: change the music directory on the server
//! - q: quit

mod config;
mod logging;
mod server_api;
mod state;
mod ui;
mod worker;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::{CliOverrides, RemoteConfig};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "jukebox-remote", version = VERSION)]
struct Args {
    /// Base URL of the playback server, e.g. http://192.168.1.10:5000
    #[arg(long)]
    server: Option<String>,

    /// Status poll interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Volume change per +/- key press, in percent
    #[arg(long)]
    volume_step: Option<u16>,

    /// Optional config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_rx = logging::init();

    let cfg = RemoteConfig::discover(args.config.as_deref())?;
    let settings = config::resolve(
        &CliOverrides {
            server: args.server,
            poll_interval_ms: args.poll_ms,
            volume_step: args.volume_step,
        },
        &cfg,
    )?;
    tracing::info!(server = %settings.server, poll = ?settings.poll_interval, "starting remote");

    ui::run_tui(settings, log_rx)
}
