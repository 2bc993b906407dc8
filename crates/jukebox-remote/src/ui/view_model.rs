//! UI view-models for the TUI.
//!
//! This module converts `App` state into render-ready strings, icons and
//! click targets so `render.rs` stays layout-focused. Everything here is
//! pure: the same state always yields the same `UiView`.

use jukebox_types::TrackEntry;

use crate::state::ClientPlayerState;
use crate::ui::app::App;

pub(crate) const NO_TRACK_LABEL: &str = "No track playing";
pub(crate) const EMPTY_PLAYLIST_LABEL: &str =
    "No tracks loaded. Open a music directory to get started.";

const DIRECTORY_DISPLAY_MAX: usize = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlaybackIcon {
    Play,
    Pause,
}

impl PlaybackIcon {
    pub(crate) fn glyph(self) -> &'static str {
        match self {
            PlaybackIcon::Play => "▶",
            PlaybackIcon::Pause => "⏸",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VolumeIcon {
    High,
    Muted,
}

impl VolumeIcon {
    pub(crate) fn glyph(self) -> &'static str {
        match self {
            VolumeIcon::High => "🔊",
            VolumeIcon::Muted => "🔇",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct UiView {
    pub(crate) header_lines: Vec<String>,
    pub(crate) now_playing: NowPlayingView,
    pub(crate) tracks: TrackListView,
    pub(crate) status_line: String,
    pub(crate) keys_line: String,
    /// Loading overlay message; the overlay is drawn above everything else.
    pub(crate) loading: Option<String>,
    pub(crate) active_modal: Option<UiModal>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NowPlayingView {
    pub(crate) playback_icon: PlaybackIcon,
    /// "Playing", "Paused" or "Stopped".
    pub(crate) playback_label: &'static str,
    pub(crate) volume_icon: VolumeIcon,
    /// Slider position, `0..=100`.
    pub(crate) volume_pct: u16,
    pub(crate) volume_label: String,
    pub(crate) track_name: String,
    pub(crate) track_info: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TrackListView {
    Empty { placeholder: String },
    Rows(Vec<TrackRow>),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TrackRow {
    /// Server-side index passed to `play` when the row is clicked.
    pub(crate) index: usize,
    pub(crate) label: String,
    pub(crate) current: bool,
}

impl TrackListView {
    /// Server indices bound to each visible row, in row order.
    pub(crate) fn click_targets(&self) -> Vec<usize> {
        match self {
            TrackListView::Empty { .. } => Vec::new(),
            TrackListView::Rows(rows) => rows.iter().map(|row| row.index).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum UiModal {
    Help { title: String, body: String, layout: ModalLayout },
    Logs { title: String, empty: bool, layout: ModalLayout },
    Directory { title: String, input: String, hint: String, layout: ModalLayout },
    Alert { title: String, body: String, layout: ModalLayout },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ModalLayout {
    pub(crate) width_pct: u16,
    pub(crate) height_pct: u16,
}

impl UiView {
    pub(crate) fn from_app(app: &App) -> Self {
        let directory_line = app
            .state
            .directory
            .as_deref()
            .map(format_directory_path)
            .unwrap_or_else(|| "-".into());
        let header_lines = vec![
            format!("jukebox-remote  →  {}", app.server),
            format!("dir: {directory_line}"),
        ];

        Self {
            header_lines,
            now_playing: status_view(&app.state, app.volume_preview),
            tracks: track_list_view(&app.state.tracks),
            status_line: format!("status: {}", app.status),
            keys_line: "keys: Space play/pause | n/→ next | p/← prev | m mute | +/- volume | s shuffle | d dir | l logs | h help | q quit".to_string(),
            loading: app.loading.as_ref().map(|l| l.message.clone()),
            active_modal: build_active_modal(app),
        }
    }
}

/// Map playback flags, volume and current track to indicators.
///
/// `volume_preview` is the percentage the user just asked for; it is shown
/// until the server echoes the applied value.
pub(crate) fn status_view(state: &ClientPlayerState, volume_preview: Option<u16>) -> NowPlayingView {
    let playback_icon = if state.playing {
        PlaybackIcon::Pause
    } else {
        PlaybackIcon::Play
    };
    let playback_label = match (state.playing, state.paused) {
        (true, _) => "Playing",
        (false, true) => "Paused",
        (false, false) => "Stopped",
    };
    let volume_icon = if state.muted {
        VolumeIcon::Muted
    } else {
        VolumeIcon::High
    };
    let volume_pct = volume_preview
        .map(|pct| pct.min(100))
        .unwrap_or_else(|| volume_percent(state.volume));
    let (track_name, track_info) = match state.current_track.as_ref() {
        Some(track) => (
            track.filename.clone(),
            format!("Track {} of {}", track.index, track.total),
        ),
        None => (NO_TRACK_LABEL.to_string(), String::new()),
    };

    NowPlayingView {
        playback_icon,
        playback_label,
        volume_icon,
        volume_pct,
        volume_label: format!("{volume_pct}%"),
        track_name,
        track_info,
    }
}

pub(crate) fn track_list_view(tracks: &[TrackEntry]) -> TrackListView {
    if tracks.is_empty() {
        return TrackListView::Empty {
            placeholder: EMPTY_PLAYLIST_LABEL.to_string(),
        };
    }
    let rows = tracks
        .iter()
        .map(|track| TrackRow {
            index: track.index,
            label: format!("{:>3}  {}", track.index + 1, track.filename),
            current: track.is_current,
        })
        .collect();
    TrackListView::Rows(rows)
}

/// Volume fraction to a slider position in `0..=100`.
pub(crate) fn volume_percent(volume: f64) -> u16 {
    (volume * 100.0).round().clamp(0.0, 100.0) as u16
}

/// Shorten long paths to their last three segments for display.
///
/// Paths over 40 characters that split (on `/` or `\`) into more than four
/// segments become `.../a/b/c`; everything else is returned unchanged.
pub(crate) fn format_directory_path(path: &str) -> String {
    if path.chars().count() > DIRECTORY_DISPLAY_MAX {
        let parts: Vec<&str> = path.split(['/', '\\']).collect();
        if parts.len() > 4 {
            return format!(".../{}", parts[parts.len() - 3..].join("/"));
        }
    }
    path.to_string()
}

fn build_help_lines() -> Vec<String> {
    vec![
        "Playback".to_string(),
        "  Space        play/pause".to_string(),
        "  n or →       next track".to_string(),
        "  p or ←       previous track".to_string(),
        "  s            shuffle".to_string(),
        "".to_string(),
        "Volume".to_string(),
        "  m            mute/unmute".to_string(),
        "  + / -        volume up/down".to_string(),
        "  click gauge  set volume".to_string(),
        "".to_string(),
        "Tracks".to_string(),
        "  ↑/↓          select".to_string(),
        "  Enter        play selected".to_string(),
        "  click row    play track".to_string(),
        "".to_string(),
        "Other".to_string(),
        "  d            change music directory".to_string(),
        "  l            logs".to_string(),
        "  h or ?       help".to_string(),
        "  q            quit".to_string(),
        "  Esc          close modal".to_string(),
    ]
}

fn build_active_modal(app: &App) -> Option<UiModal> {
    if let Some(message) = app.alert.as_ref() {
        return Some(UiModal::Alert {
            title: "Error".to_string(),
            body: format!("{message}\n\nPress Enter to dismiss"),
            layout: ModalLayout { width_pct: 50, height_pct: 25 },
        });
    }
    if let Some(input) = app.directory_input.as_ref() {
        return Some(UiModal::Directory {
            title: "Music Directory".to_string(),
            input: input.clone(),
            hint: "Enter to load, Esc to close".to_string(),
            layout: ModalLayout { width_pct: 70, height_pct: 25 },
        });
    }
    if app.logs_open {
        return Some(UiModal::Logs {
            title: "Logs (Esc to close, ↑/↓ scroll)".to_string(),
            empty: app.logs.is_empty(),
            layout: ModalLayout { width_pct: 90, height_pct: 80 },
        });
    }
    if app.help_open {
        return Some(UiModal::Help {
            title: "Help".to_string(),
            body: build_help_lines().join("\n"),
            layout: ModalLayout { width_pct: 60, height_pct: 70 },
        });
    }
    None
}
