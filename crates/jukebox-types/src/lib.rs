//! Wire types for the jukebox playback service HTTP API.
//!
//! Every response type tolerates missing fields (`#[serde(default)]`) and
//! ignores unknown ones, so older or newer servers decode without errors.

use serde::{Deserialize, Serialize};

/// Track currently loaded on the server.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CurrentTrack {
    /// File name without directory.
    pub filename: String,
    /// 1-based position in the play order.
    pub index: u64,
    /// Number of tracks in the play order.
    pub total: u64,
    /// Full path on the server, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Response of `GET /api/status`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusResponse {
    /// `true` while audio is being produced.
    pub playing: bool,
    /// `true` when playback is paused (as opposed to stopped).
    pub paused: bool,
    /// `true` when output is muted.
    pub muted: bool,
    /// Output volume in `0.0..=1.0`.
    pub volume: f64,
    /// Loaded track, `None` when nothing is loaded.
    pub current_track: Option<CurrentTrack>,
    /// Size of the playlist, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tracks: Option<u64>,
}

/// One playlist entry as listed by `GET /api/tracks`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackEntry {
    /// 0-based index into the unshuffled playlist; this is what `POST /api/play` takes.
    pub index: usize,
    /// File name without directory.
    pub filename: String,
    /// `true` for the track the server considers current.
    pub is_current: bool,
    /// Full path on the server, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Response of `GET /api/tracks`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TracksResponse {
    pub tracks: Vec<TrackEntry>,
    /// Informational message, e.g. when no tracks are loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `GET /api/directory`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DirectoryResponse {
    pub directory: Option<String>,
}

/// Body of `POST /api/directory`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryChangeRequest {
    pub directory: String,
}

/// Response of `POST /api/directory`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DirectoryChangeResponse {
    pub success: bool,
    /// Directory now being served, present on success.
    pub directory: Option<String>,
    /// Failure reason, present when `success` is `false`.
    pub message: Option<String>,
    /// Number of tracks found, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<u64>,
}

/// Body of `POST /api/play`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayRequest {
    pub index: usize,
}

/// Body of `POST /api/volume`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct VolumeRequest {
    /// Requested volume in `0.0..=1.0`.
    pub volume: f64,
}

/// Response of `POST /api/volume`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeResponse {
    pub success: bool,
    /// Volume actually applied by the server (clamped).
    pub volume: Option<f64>,
    pub message: Option<String>,
}

/// Response of `POST /api/mute`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MuteResponse {
    pub success: bool,
    pub muted: Option<bool>,
}

/// Generic response of the bodiless transport actions
/// (`toggle`, `next`, `previous`, `play`, `shuffle`).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ActionResponse {
    pub success: bool,
    pub message: Option<String>,
}
