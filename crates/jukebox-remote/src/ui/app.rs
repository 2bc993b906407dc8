use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Position, Rect},
    widgets::ListState,
};

use crate::config::Settings;
use crate::server_api::HttpPlayerApi;
use crate::state::ClientPlayerState;
use crate::worker::{self, Action, Command, Event, Generation};

use super::render;
use super::view_model::{track_list_view, volume_percent};

const LOG_CAP: usize = 500;
const INIT_MESSAGE: &str = "Initializing player...";

/// Launch the TUI, spawn the worker thread, and drive the event loop.
pub(crate) fn run_tui(settings: Settings, log_rx: Receiver<String>) -> Result<()> {
    let (cmd_tx, cmd_rx) = unbounded::<Command>();
    let (evt_tx, evt_rx) = unbounded::<Event>();
    std::thread::spawn({
        let api = HttpPlayerApi::new(&settings.server);
        move || worker::worker_main(api, cmd_rx, evt_tx)
    });

    let mut app = App::new(&settings, cmd_tx, log_rx);
    app.start();

    let mut term = init_terminal()?;
    let result = ui_loop(&mut term, &mut app, evt_rx);

    app.shutdown();
    restore_terminal(&mut term)?;
    result
}

/// Overlay shown while an action and its refreshes are in flight.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Loading {
    pub(crate) generation: Generation,
    pub(crate) message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Continue,
    Quit,
}

/// In-memory UI state for rendering + interaction.
pub(crate) struct App {
    pub(crate) server: String,
    pub(crate) state: ClientPlayerState,
    pub(crate) loading: Option<Loading>,
    pub(crate) list_state: ListState,
    /// Text of the directory prompt while it is open.
    pub(crate) directory_input: Option<String>,
    pub(crate) alert: Option<String>,
    pub(crate) help_open: bool,
    pub(crate) status: String,
    /// Percentage requested by the user, shown until the server answers.
    pub(crate) volume_preview: Option<u16>,

    pub(crate) logs_open: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) logs_scroll: usize,

    /// Inner area of the track list from the last frame, for mouse hit-testing.
    pub(crate) track_list_area: Rect,
    pub(crate) volume_area: Rect,

    volume_step: u16,
    poll_interval: Duration,
    last_poll: Option<Instant>,
    initialized: bool,
    next_generation: Generation,
    latest_action: Generation,
    cmd_tx: Sender<Command>,
    log_rx: Receiver<String>,
}

impl App {
    pub(crate) fn new(settings: &Settings, cmd_tx: Sender<Command>, log_rx: Receiver<String>) -> Self {
        Self {
            server: settings.server.clone(),
            state: ClientPlayerState::default(),
            loading: None,
            list_state: ListState::default(),
            directory_input: None,
            alert: None,
            help_open: false,
            status: "Connecting".to_string(),
            volume_preview: None,
            logs_open: false,
            logs: VecDeque::new(),
            logs_scroll: 0,
            track_list_area: Rect::default(),
            volume_area: Rect::default(),
            volume_step: settings.volume_step,
            poll_interval: settings.poll_interval,
            last_poll: None,
            initialized: false,
            next_generation: 0,
            latest_action: 0,
            cmd_tx,
            log_rx,
        }
    }

    /// Fetch status, tracks and directory behind the init overlay. Polling starts once it finishes.
    pub(crate) fn start(&mut self) {
        let generation = self.begin(INIT_MESSAGE);
        self.send(Command::Initialize { generation });
    }

    pub(crate) fn shutdown(&self) {
        self.cmd_tx.send(Command::Quit).ok();
    }

    pub(crate) fn toggle_playback(&mut self) {
        self.dispatch(Action::TogglePlayback);
    }

    pub(crate) fn next_track(&mut self) {
        self.dispatch(Action::Next);
    }

    pub(crate) fn previous_track(&mut self) {
        self.dispatch(Action::Previous);
    }

    pub(crate) fn play_track_at(&mut self, index: usize) {
        self.dispatch(Action::PlayAt(index));
    }

    pub(crate) fn shuffle(&mut self) {
        self.dispatch(Action::Shuffle);
    }

    pub(crate) fn toggle_mute(&mut self) {
        self.dispatch(Action::ToggleMute);
    }

    /// Request a new volume. The label follows the request right away.
    pub(crate) fn set_volume(&mut self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        self.volume_preview = Some(volume_percent(fraction));
        self.dispatch(Action::SetVolume(fraction));
    }

    /// Ask the server to load a new music directory. Blank input is ignored.
    pub(crate) fn set_directory(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        self.directory_input = None;
        self.dispatch(Action::SetDirectory(path.to_string()));
    }

    fn step_volume(&mut self, delta: i32) {
        let current = self
            .volume_preview
            .unwrap_or_else(|| volume_percent(self.state.volume)) as i32;
        let target = (current + delta).clamp(0, 100);
        self.set_volume(target as f64 / 100.0);
    }

    fn dispatch(&mut self, action: Action) {
        let generation = match action.loading_message() {
            Some(message) => self.begin(message),
            None => self.bump_generation(),
        };
        self.status = action_status(&action);
        self.send(Command::Action { generation, action });
    }

    fn begin(&mut self, message: &str) -> Generation {
        let generation = self.bump_generation();
        self.latest_action = generation;
        self.loading = Some(Loading {
            generation,
            message: message.to_string(),
        });
        generation
    }

    fn bump_generation(&mut self) -> Generation {
        self.next_generation += 1;
        self.next_generation
    }

    fn send(&mut self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("worker is not running");
            self.loading = None;
            self.status = "Worker stopped".into();
        }
    }

    /// Issue a periodic status poll when due. A due tick is skipped while the overlay is shown.
    pub(crate) fn tick(&mut self, now: Instant) {
        if !self.initialized {
            return;
        }
        let due = self
            .last_poll
            .is_none_or(|last| now.saturating_duration_since(last) >= self.poll_interval);
        if !due {
            return;
        }
        self.last_poll = Some(now);
        if self.loading.is_some() {
            return;
        }
        let generation = self.bump_generation();
        self.send(Command::Poll { generation });
    }

    pub(crate) fn apply_event(&mut self, ev: Event) {
        match ev {
            Event::Status { generation, status } => {
                if generation < self.latest_action {
                    tracing::debug!(generation, latest = self.latest_action, "dropping stale status");
                    return;
                }
                self.state.apply_status(status);
                self.volume_preview = None;
            }
            Event::Tracks { generation, tracks } => {
                if generation < self.latest_action {
                    tracing::debug!(generation, latest = self.latest_action, "dropping stale tracks");
                    return;
                }
                let followed_current = self.list_state.selected().is_some()
                    && self.list_state.selected() == self.state.current_row();
                self.state.replace_tracks(tracks);
                self.sync_selection(followed_current);
            }
            Event::Directory { directory } => self.state.directory = Some(directory),
            Event::Muted { muted } => self.state.muted = muted,
            Event::Volume { volume } => {
                self.state.volume = volume;
                self.volume_preview = None;
            }
            Event::DirectoryRejected { message } => {
                self.alert = Some(format!("Error: {message}"));
                self.status = "Directory change failed".into();
            }
            Event::Finished { generation } => {
                if self.loading.as_ref().is_some_and(|l| l.generation == generation) {
                    self.loading = None;
                    if !self.initialized {
                        self.initialized = true;
                        self.last_poll = Some(Instant::now());
                    }
                    self.status = "Ready".into();
                }
            }
        }
    }

    fn sync_selection(&mut self, follow_current: bool) {
        let len = self.state.tracks.len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        match self.list_state.selected() {
            Some(_) if follow_current => {
                let row = self.state.current_row().unwrap_or(0);
                self.list_state.select(Some(row));
            }
            Some(row) if row < len => {}
            Some(_) => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(self.state.current_row().unwrap_or(0))),
        }
    }

    fn select_next(&mut self) {
        let len = self.state.tracks.len();
        if len == 0 {
            return;
        }
        let next = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.list_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.state.tracks.is_empty() {
            return;
        }
        let prev = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(prev));
    }

    fn play_selected(&mut self) {
        if let Some(row) = self.list_state.selected() {
            self.click_track_row(row);
        }
    }

    /// Play the track bound to `row` of the rendered list. Rows without a binding are ignored.
    pub(crate) fn click_track_row(&mut self, row: usize) {
        let targets = track_list_view(&self.state.tracks).click_targets();
        let Some(&index) = targets.get(row) else {
            return;
        };
        self.list_state.select(Some(row));
        self.play_track_at(index);
    }

    fn open_directory_prompt(&mut self) {
        self.directory_input = Some(self.state.directory.clone().unwrap_or_default());
    }

    fn input_locked(&self) -> bool {
        self.loading.is_some()
            || self.alert.is_some()
            || self.directory_input.is_some()
            || self.help_open
            || self.logs_open
    }

    pub(crate) fn handle_key(&mut self, k: KeyEvent) -> KeyOutcome {
        if k.kind != KeyEventKind::Press {
            return KeyOutcome::Continue;
        }
        if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
            return KeyOutcome::Quit;
        }
        if self.alert.is_some() {
            if matches!(k.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return KeyOutcome::Continue;
        }
        if let Some(input) = self.directory_input.as_mut() {
            // The prompt owns the keyboard; nothing here reaches the shortcuts.
            match k.code {
                KeyCode::Esc => self.directory_input = None,
                KeyCode::Enter => {
                    let path = input.clone();
                    self.set_directory(&path);
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return KeyOutcome::Continue;
        }
        if self.logs_open {
            match k.code {
                KeyCode::Char('q') => return KeyOutcome::Quit,
                KeyCode::Esc | KeyCode::Char('l') => self.toggle_logs(),
                KeyCode::Up => self.scroll_logs_up(),
                KeyCode::Down => self.scroll_logs_down(),
                _ => {}
            }
            return KeyOutcome::Continue;
        }
        if self.help_open {
            match k.code {
                KeyCode::Char('q') => return KeyOutcome::Quit,
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?') => self.help_open = false,
                _ => {}
            }
            return KeyOutcome::Continue;
        }
        if self.loading.is_some() {
            match k.code {
                KeyCode::Char('q') => return KeyOutcome::Quit,
                KeyCode::Char('l') => self.toggle_logs(),
                _ => {}
            }
            return KeyOutcome::Continue;
        }

        let step = i32::from(self.volume_step);
        match k.code {
            KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::Char(' ') => self.toggle_playback(),
            KeyCode::Right | KeyCode::Char('n') => self.next_track(),
            KeyCode::Left | KeyCode::Char('p') => self.previous_track(),
            KeyCode::Char('m') => self.toggle_mute(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_volume(step),
            KeyCode::Char('-') => self.step_volume(-step),
            KeyCode::Char('s') => self.shuffle(),
            KeyCode::Char('d') => self.open_directory_prompt(),
            KeyCode::Char('l') => self.toggle_logs(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.help_open = true,
            KeyCode::Up => self.select_prev(),
            KeyCode::Down => self.select_next(),
            KeyCode::Enter => self.play_selected(),
            _ => {}
        }
        KeyOutcome::Continue
    }

    pub(crate) fn handle_mouse(&mut self, m: MouseEvent) {
        if m.kind != MouseEventKind::Down(MouseButton::Left) || self.input_locked() {
            return;
        }
        let pos = Position::new(m.column, m.row);
        if self.track_list_area.contains(pos) {
            let row = usize::from(m.row - self.track_list_area.y) + self.list_state.offset();
            self.click_track_row(row);
        } else if self.volume_area.contains(pos) {
            let span = f64::from(self.volume_area.width.saturating_sub(1).max(1));
            self.set_volume(f64::from(m.column - self.volume_area.x) / span);
        }
    }

    fn toggle_logs(&mut self) {
        self.logs_open = !self.logs_open;
        if !self.logs_open {
            self.logs_scroll = 0;
        }
    }

    fn scroll_logs_up(&mut self) {
        let max = self.logs.len().saturating_sub(1);
        self.logs_scroll = (self.logs_scroll + 1).min(max);
    }

    fn scroll_logs_down(&mut self) {
        self.logs_scroll = self.logs_scroll.saturating_sub(1);
    }

    fn push_log_line(&mut self, line: String) {
        if self.logs.len() >= LOG_CAP {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    fn drain_logs(&mut self) {
        while let Ok(line) = self.log_rx.try_recv() {
            self.push_log_line(line);
        }
    }
}

fn action_status(action: &Action) -> String {
    match action {
        Action::TogglePlayback => "Toggling playback".into(),
        Action::Next => "Next track".into(),
        Action::Previous => "Previous track".into(),
        Action::PlayAt(index) => format!("Playing track {}", index + 1),
        Action::Shuffle => "Shuffling".into(),
        Action::ToggleMute => "Toggling mute".into(),
        Action::SetVolume(v) => format!("Volume {}%", volume_percent(*v)),
        Action::SetDirectory(dir) => format!("Loading {dir}"),
    }
}

fn ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    evt_rx: Receiver<Event>,
) -> Result<()> {
    let tick = Duration::from_millis(33);
    let mut last_tick = Instant::now();

    loop {
        // Pump worker events.
        while let Ok(ev) = evt_rx.try_recv() {
            app.apply_event(ev);
        }

        app.drain_logs();
        terminal.draw(|f| render::draw(f, app))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).context("poll terminal events")? {
            match event::read().context("read terminal event")? {
                CEvent::Key(k) => {
                    if app.handle_key(k) == KeyOutcome::Quit {
                        return Ok(());
                    }
                }
                CEvent::Mouse(m) => app.handle_mouse(m),
                _ => {}
            }
        }

        app.tick(Instant::now());

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
        }
    }
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("create terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use jukebox_types::{StatusResponse, TrackEntry};

    fn test_app() -> (App, Receiver<Command>) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (_log_tx, log_rx) = unbounded();
        let settings = Settings {
            server: "http://127.0.0.1:5000".to_string(),
            poll_interval: Duration::from_secs(1),
            volume_step: 5,
        };
        (App::new(&settings, cmd_tx, log_rx), cmd_rx)
    }

    /// App whose initialization has completed, with the command queue drained.
    fn ready_app() -> (App, Receiver<Command>) {
        let (mut app, cmd_rx) = test_app();
        app.start();
        app.apply_event(Event::Finished { generation: 1 });
        cmd_rx.try_iter().for_each(drop);
        (app, cmd_rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn track(index: usize, filename: &str, is_current: bool) -> TrackEntry {
        TrackEntry {
            index,
            filename: filename.to_string(),
            is_current,
            path: None,
        }
    }

    fn sent_actions(cmd_rx: &Receiver<Command>) -> Vec<Action> {
        cmd_rx
            .try_iter()
            .filter_map(|cmd| match cmd {
                Command::Action { action, .. } => Some(action),
                _ => None,
            })
            .collect()
    }

    fn last_generation(app: &App) -> Generation {
        app.loading.as_ref().map(|l| l.generation).unwrap()
    }

    #[test]
    fn start_shows_init_overlay_and_defers_polling() {
        let (mut app, cmd_rx) = test_app();
        app.start();
        assert_eq!(app.loading.as_ref().unwrap().message, INIT_MESSAGE);
        assert_eq!(cmd_rx.try_recv().unwrap(), Command::Initialize { generation: 1 });

        app.tick(Instant::now() + Duration::from_secs(5));
        assert!(cmd_rx.try_recv().is_err());

        app.apply_event(Event::Finished { generation: 1 });
        assert!(app.loading.is_none());
        app.tick(Instant::now() + Duration::from_secs(2));
        assert!(matches!(cmd_rx.try_recv().unwrap(), Command::Poll { .. }));
    }

    #[test]
    fn poll_is_skipped_while_overlay_is_visible() {
        let (mut app, cmd_rx) = ready_app();
        app.next_track();
        let generation = last_generation(&app);
        cmd_rx.try_iter().for_each(drop);

        let later = Instant::now() + Duration::from_secs(2);
        app.tick(later);
        assert!(cmd_rx.try_recv().is_err());

        app.apply_event(Event::Finished { generation });
        app.tick(later + Duration::from_secs(1));
        assert!(matches!(cmd_rx.try_recv().unwrap(), Command::Poll { .. }));
    }

    #[test]
    fn poll_waits_for_the_interval() {
        let (mut app, cmd_rx) = ready_app();
        let now = Instant::now() + Duration::from_secs(2);
        app.tick(now);
        app.tick(now + Duration::from_millis(400));
        assert_eq!(cmd_rx.try_iter().count(), 1);
    }

    #[test]
    fn status_from_before_an_action_is_discarded() {
        let (mut app, _cmd_rx) = ready_app();
        app.tick(Instant::now() + Duration::from_secs(2));
        let poll_generation = app.next_generation;
        app.toggle_playback();
        let action_generation = last_generation(&app);

        app.apply_event(Event::Status {
            generation: poll_generation,
            status: StatusResponse {
                playing: false,
                ..Default::default()
            },
        });
        app.apply_event(Event::Status {
            generation: action_generation,
            status: StatusResponse {
                playing: true,
                volume: 0.5,
                ..Default::default()
            },
        });
        app.apply_event(Event::Status {
            generation: poll_generation,
            status: StatusResponse::default(),
        });
        assert!(app.state.playing);
    }

    #[test]
    fn clicking_a_row_plays_that_track_once() {
        let (mut app, cmd_rx) = ready_app();
        app.apply_event(Event::Tracks {
            generation: 1,
            tracks: (0..5).map(|i| track(i, &format!("t{i}.mp3"), i == 0)).collect(),
        });
        app.click_track_row(3);
        assert_eq!(sent_actions(&cmd_rx), vec![Action::PlayAt(3)]);
        assert_eq!(app.loading.as_ref().unwrap().message, "Loading track...");
    }

    #[test]
    fn mouse_click_maps_to_track_row() {
        let (mut app, cmd_rx) = ready_app();
        app.apply_event(Event::Tracks {
            generation: 1,
            tracks: vec![track(0, "a.mp3", true), track(1, "b.mp3", false)],
        });
        app.track_list_area = Rect::new(1, 10, 40, 5);
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: 11,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(sent_actions(&cmd_rx), vec![Action::PlayAt(1)]);
    }

    #[test]
    fn row_clicks_use_the_index_bound_to_the_rendered_row() {
        let (mut app, cmd_rx) = ready_app();
        app.apply_event(Event::Tracks {
            generation: 1,
            tracks: vec![track(4, "e.mp3", false), track(2, "c.mp3", true)],
        });
        app.click_track_row(2);
        assert!(cmd_rx.try_recv().is_err());
        app.click_track_row(1);
        assert_eq!(sent_actions(&cmd_rx), vec![Action::PlayAt(2)]);
    }

    #[test]
    fn gauge_click_sets_volume_from_position() {
        let (mut app, cmd_rx) = ready_app();
        app.volume_area = Rect::new(10, 3, 21, 1);
        let click = |column| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };

        app.handle_mouse(click(10));
        assert_eq!(app.volume_preview, Some(0));
        app.handle_mouse(click(30));
        assert_eq!(app.volume_preview, Some(100));
        app.handle_mouse(click(20));
        assert_eq!(app.volume_preview, Some(50));
        assert_eq!(
            sent_actions(&cmd_rx),
            vec![
                Action::SetVolume(0.0),
                Action::SetVolume(1.0),
                Action::SetVolume(0.5)
            ]
        );

        app.next_track();
        cmd_rx.try_iter().for_each(drop);
        app.handle_mouse(click(12));
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.volume_preview, Some(50));
    }

    #[test]
    fn clicking_with_no_tracks_does_nothing() {
        let (mut app, cmd_rx) = ready_app();
        app.click_track_row(0);
        app.handle_key(key(KeyCode::Enter));
        assert!(cmd_rx.try_recv().is_err());
        assert!(app.loading.is_none());
    }

    #[test]
    fn shortcuts_map_to_actions() {
        let (mut app, cmd_rx) = ready_app();
        let cases = [
            (KeyCode::Char(' '), Action::TogglePlayback),
            (KeyCode::Right, Action::Next),
            (KeyCode::Char('p'), Action::Previous),
            (KeyCode::Char('s'), Action::Shuffle),
        ];
        for (code, expected) in cases {
            app.handle_key(key(code));
            let generation = last_generation(&app);
            assert_eq!(sent_actions(&cmd_rx), vec![expected]);
            app.apply_event(Event::Finished { generation });
        }
        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(sent_actions(&cmd_rx), vec![Action::ToggleMute]);
        assert!(app.loading.is_none());
    }

    #[test]
    fn keys_are_ignored_while_loading() {
        let (mut app, cmd_rx) = ready_app();
        app.next_track();
        cmd_rx.try_iter().for_each(drop);
        app.handle_key(key(KeyCode::Char('n')));
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), KeyOutcome::Quit);
    }

    #[test]
    fn finished_for_another_generation_keeps_overlay() {
        let (mut app, _cmd_rx) = ready_app();
        app.shuffle();
        let generation = last_generation(&app);
        app.apply_event(Event::Finished { generation: generation - 1 });
        assert!(app.loading.is_some());
        app.apply_event(Event::Finished { generation });
        assert!(app.loading.is_none());
    }

    #[test]
    fn volume_keys_step_from_displayed_value() {
        let (mut app, cmd_rx) = ready_app();
        app.state.volume = 0.7;
        app.handle_key(key(KeyCode::Char('+')));
        assert_eq!(app.volume_preview, Some(75));
        assert_eq!(sent_actions(&cmd_rx), vec![Action::SetVolume(0.75)]);
        assert!(app.loading.is_none());

        app.apply_event(Event::Volume { volume: 0.75 });
        assert_eq!(app.volume_preview, None);
        assert_eq!(app.state.volume, 0.75);
    }

    #[test]
    fn set_volume_clamps_to_unit_range() {
        let (mut app, cmd_rx) = ready_app();
        app.set_volume(1.7);
        app.set_volume(-0.2);
        assert_eq!(
            sent_actions(&cmd_rx),
            vec![Action::SetVolume(1.0), Action::SetVolume(0.0)]
        );
    }

    #[test]
    fn directory_prompt_keeps_keys_out_of_shortcuts() {
        let (mut app, cmd_rx) = ready_app();
        app.handle_key(key(KeyCode::Char('d')));
        for c in "/music n m".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.directory_input.as_deref(), Some("/music n m"));

        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            sent_actions(&cmd_rx),
            vec![Action::SetDirectory("/music n".to_string())]
        );
        assert!(app.directory_input.is_none());
        assert_eq!(app.loading.as_ref().unwrap().message, "Loading music directory...");
    }

    #[test]
    fn blank_directory_is_ignored() {
        let (mut app, cmd_rx) = ready_app();
        app.set_directory("   ");
        assert!(cmd_rx.try_recv().is_err());
        assert!(app.loading.is_none());
    }

    #[test]
    fn rejected_directory_raises_alert() {
        let (mut app, _cmd_rx) = ready_app();
        app.set_directory("/nope");
        let generation = last_generation(&app);
        app.apply_event(Event::DirectoryRejected {
            message: "Directory not found: /nope".to_string(),
        });
        app.apply_event(Event::Finished { generation });
        assert_eq!(app.alert.as_deref(), Some("Error: Directory not found: /nope"));
        assert!(app.loading.is_none());

        app.handle_key(key(KeyCode::Char('n')));
        assert!(app.alert.is_some());
        app.handle_key(key(KeyCode::Enter));
        assert!(app.alert.is_none());
    }

    #[test]
    fn selection_follows_current_track() {
        let (mut app, _cmd_rx) = ready_app();
        app.apply_event(Event::Tracks {
            generation: 1,
            tracks: vec![track(0, "a.mp3", true), track(1, "b.mp3", false)],
        });
        assert_eq!(app.list_state.selected(), Some(0));
        app.apply_event(Event::Tracks {
            generation: 1,
            tracks: vec![track(0, "a.mp3", false), track(1, "b.mp3", true)],
        });
        assert_eq!(app.list_state.selected(), Some(1));
        app.apply_event(Event::Tracks {
            generation: 1,
            tracks: Vec::new(),
        });
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn log_buffer_is_capped() {
        let (mut app, _cmd_rx) = test_app();
        for i in 0..LOG_CAP + 10 {
            app.push_log_line(format!("line {i}"));
        }
        assert_eq!(app.logs.len(), LOG_CAP);
        assert_eq!(app.logs.front().map(String::as_str), Some("line 10"));
    }
}
