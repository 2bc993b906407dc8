//! Local mirror of the remote player.

use jukebox_types::{CurrentTrack, StatusResponse, TrackEntry};

/// Last known server state. Only ever overwritten with server-sourced values.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ClientPlayerState {
    pub(crate) playing: bool,
    pub(crate) paused: bool,
    pub(crate) muted: bool,
    pub(crate) volume: f64,
    pub(crate) current_track: Option<CurrentTrack>,
    pub(crate) tracks: Vec<TrackEntry>,
    pub(crate) directory: Option<String>,
}

impl Default for ClientPlayerState {
    fn default() -> Self {
        Self {
            playing: false,
            paused: false,
            muted: false,
            volume: 0.5,
            current_track: None,
            tracks: Vec::new(),
            directory: None,
        }
    }
}

impl ClientPlayerState {
    pub(crate) fn apply_status(&mut self, status: StatusResponse) {
        self.playing = status.playing;
        self.paused = status.paused;
        self.muted = status.muted;
        self.volume = status.volume;
        self.current_track = status.current_track;
    }

    pub(crate) fn replace_tracks(&mut self, tracks: Vec<TrackEntry>) {
        self.tracks = tracks;
    }

    /// Position in `tracks` of the entry flagged as current.
    pub(crate) fn current_row(&self) -> Option<usize> {
        self.tracks.iter().position(|t| t.is_current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_overwrites_flags_and_track() {
        let mut state = ClientPlayerState {
            current_track: Some(CurrentTrack {
                filename: "old.mp3".into(),
                index: 1,
                total: 1,
                path: None,
            }),
            ..Default::default()
        };
        state.apply_status(StatusResponse {
            playing: true,
            paused: false,
            muted: true,
            volume: 0.3,
            current_track: None,
            total_tracks: None,
        });
        assert!(state.playing);
        assert!(state.muted);
        assert_eq!(state.volume, 0.3);
        assert!(state.current_track.is_none());
    }

    #[test]
    fn tracks_are_replaced_wholesale() {
        let mut state = ClientPlayerState::default();
        let entry = |index, is_current| TrackEntry {
            index,
            filename: format!("{index}.mp3"),
            is_current,
            path: None,
        };
        state.replace_tracks(vec![entry(0, false), entry(1, true), entry(2, false)]);
        assert_eq!(state.current_row(), Some(1));
        state.replace_tracks(vec![entry(0, false)]);
        assert_eq!(state.tracks.len(), 1);
        assert_eq!(state.current_row(), None);
    }
}
