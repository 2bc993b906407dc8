//! Background worker that owns the HTTP client and talks to the server.
//!
//! Commands are consumed from a single FIFO queue, so requests go out one at
//! a time in the order the UI issued them. Every command carries a
//! generation; results are tagged with it so the UI can drop status
//! snapshots that were requested before a later action.

use crossbeam_channel::{Receiver, Sender};
use jukebox_types::{StatusResponse, TrackEntry};

use crate::server_api::PlayerApi;

pub(crate) type Generation = u64;

/// User-facing operations that mutate server state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Action {
    TogglePlayback,
    Next,
    Previous,
    PlayAt(usize),
    Shuffle,
    ToggleMute,
    SetVolume(f64),
    SetDirectory(String),
}

impl Action {
    /// Message shown on the loading overlay, `None` for actions that do not lock the UI.
    pub(crate) fn loading_message(&self) -> Option<&'static str> {
        match self {
            Action::TogglePlayback => Some("Toggling playback..."),
            Action::Next => Some("Loading next track..."),
            Action::Previous => Some("Loading previous track..."),
            Action::PlayAt(_) => Some("Loading track..."),
            Action::Shuffle => Some("Shuffling playlist..."),
            Action::SetDirectory(_) => Some("Loading music directory..."),
            Action::ToggleMute | Action::SetVolume(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    /// Fetch status, tracks and directory, each fail-soft.
    Initialize { generation: Generation },
    /// Periodic status fetch.
    Poll { generation: Generation },
    Action { generation: Generation, action: Action },
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Status { generation: Generation, status: StatusResponse },
    Tracks { generation: Generation, tracks: Vec<TrackEntry> },
    Directory { directory: String },
    Muted { muted: bool },
    Volume { volume: f64 },
    DirectoryRejected { message: String },
    /// The command with this generation has fully completed, including refreshes.
    Finished { generation: Generation },
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub(crate) fn worker_main<A: PlayerApi>(api: A, cmd_rx: Receiver<Command>, evt_tx: Sender<Event>) {
    while let Ok(cmd) = cmd_rx.recv() {
        if run_command(&api, cmd, &evt_tx) == Flow::Quit {
            break;
        }
    }
    tracing::debug!("worker stopped");
}

fn run_command<A: PlayerApi>(api: &A, cmd: Command, evt_tx: &Sender<Event>) -> Flow {
    let delivered = match cmd {
        Command::Quit => return Flow::Quit,
        Command::Initialize { generation } => {
            fetch_status(api, generation, evt_tx)
                && fetch_tracks(api, generation, evt_tx)
                && fetch_directory(api, evt_tx)
                && evt_tx.send(Event::Finished { generation }).is_ok()
        }
        Command::Poll { generation } => fetch_status(api, generation, evt_tx),
        Command::Action { generation, action } => {
            run_action(api, generation, action, evt_tx)
                && evt_tx.send(Event::Finished { generation }).is_ok()
        }
    };
    if delivered { Flow::Continue } else { Flow::Quit }
}

/// Run one action and its follow-up refreshes. Returns `false` once the UI has gone away.
fn run_action<A: PlayerApi>(
    api: &A,
    generation: Generation,
    action: Action,
    evt_tx: &Sender<Event>,
) -> bool {
    match action {
        Action::TogglePlayback => {
            note_outcome("toggle", api.toggle().map(|r| (r.success, r.message)));
            fetch_status(api, generation, evt_tx)
        }
        Action::Next => {
            note_outcome("next", api.next().map(|r| (r.success, r.message)));
            fetch_status(api, generation, evt_tx) && fetch_tracks(api, generation, evt_tx)
        }
        Action::Previous => {
            note_outcome("previous", api.previous().map(|r| (r.success, r.message)));
            fetch_status(api, generation, evt_tx) && fetch_tracks(api, generation, evt_tx)
        }
        Action::PlayAt(index) => {
            note_outcome("play", api.play(index).map(|r| (r.success, r.message)));
            fetch_status(api, generation, evt_tx) && fetch_tracks(api, generation, evt_tx)
        }
        Action::Shuffle => {
            note_outcome("shuffle", api.shuffle().map(|r| (r.success, r.message)));
            fetch_status(api, generation, evt_tx) && fetch_tracks(api, generation, evt_tx)
        }
        Action::ToggleMute => match api.mute() {
            Ok(resp) => match (resp.success, resp.muted) {
                (true, Some(muted)) => evt_tx.send(Event::Muted { muted }).is_ok(),
                _ => {
                    tracing::info!("mute toggle not applied by server");
                    true
                }
            },
            Err(e) => {
                tracing::warn!("error toggling mute: {e:#}");
                true
            }
        },
        Action::SetVolume(volume) => match api.set_volume(volume) {
            Ok(resp) => match (resp.success, resp.volume) {
                (true, Some(volume)) => evt_tx.send(Event::Volume { volume }).is_ok(),
                _ => {
                    let reason = resp.message.unwrap_or_else(|| "no reason given".into());
                    tracing::info!(requested = volume, "volume not applied by server: {reason}");
                    true
                }
            },
            Err(e) => {
                tracing::warn!("error setting volume: {e:#}");
                true
            }
        },
        Action::SetDirectory(directory) => match api.set_directory(&directory) {
            Ok(resp) if resp.success => {
                let served = resp
                    .directory
                    .filter(|d| !d.is_empty())
                    .unwrap_or(directory);
                tracing::info!(directory = %served, tracks = ?resp.tracks, "music directory changed");
                evt_tx.send(Event::Directory { directory: served }).is_ok()
                    && fetch_tracks(api, generation, evt_tx)
                    && fetch_status(api, generation, evt_tx)
            }
            Ok(resp) => {
                let message = resp.message.unwrap_or_else(|| "unknown error".into());
                tracing::warn!(directory = %directory, "directory change rejected: {message}");
                evt_tx.send(Event::DirectoryRejected { message }).is_ok()
            }
            Err(e) => {
                tracing::warn!("error changing directory: {e:#}");
                true
            }
        },
    }
}

/// Log the outcome of a transport action. Its `success` flag does not gate the refresh.
fn note_outcome(label: &str, outcome: anyhow::Result<(bool, Option<String>)>) {
    match outcome {
        Ok((true, _)) => tracing::debug!("{label} accepted"),
        Ok((false, message)) => {
            let reason = message.unwrap_or_else(|| "no reason given".into());
            tracing::info!("{label} reported failure: {reason}");
        }
        Err(e) => tracing::warn!("error sending {label}: {e:#}"),
    }
}

fn fetch_status<A: PlayerApi>(api: &A, generation: Generation, evt_tx: &Sender<Event>) -> bool {
    match api.status() {
        Ok(status) => evt_tx.send(Event::Status { generation, status }).is_ok(),
        Err(e) => {
            tracing::warn!("error fetching status: {e:#}");
            true
        }
    }
}

fn fetch_tracks<A: PlayerApi>(api: &A, generation: Generation, evt_tx: &Sender<Event>) -> bool {
    match api.tracks() {
        Ok(resp) => evt_tx
            .send(Event::Tracks {
                generation,
                tracks: resp.tracks,
            })
            .is_ok(),
        Err(e) => {
            tracing::warn!("error fetching tracks: {e:#}");
            true
        }
    }
}

fn fetch_directory<A: PlayerApi>(api: &A, evt_tx: &Sender<Event>) -> bool {
    match api.directory() {
        Ok(resp) => match resp.directory.filter(|d| !d.is_empty()) {
            Some(directory) => evt_tx.send(Event::Directory { directory }).is_ok(),
            None => true,
        },
        Err(e) => {
            tracing::warn!("error fetching directory: {e:#}");
            true
        }
    }
}
