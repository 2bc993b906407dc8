//! Ratatui UI loop.
//!
//! Keys:
//! - Space: play/pause
//! - n or Right: next track
//! - p or Left: previous track
//! - Up/Down + Enter: play the selected track (mouse click works too)
//! - m: mute/unmute
//! - + / -: volume up/down (click the gauge to set it)
//! - s: shuffle
//! - d: change music directory
//! - l: logs, h or ?: help
//! - q: quit

mod app;
mod render;
mod view_model;
mod widgets;

pub(crate) use app::run_tui;
