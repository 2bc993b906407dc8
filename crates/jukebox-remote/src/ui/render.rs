use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Gauge, ListItem, Paragraph},
};

use super::app::App;
use super::view_model::{NowPlayingView, TrackListView, UiModal, UiView};
use super::widgets::{centered_rect, list_panel, modal_text, panel_block};

pub(crate) fn draw(f: &mut Frame, app: &mut App) {
    let view = UiView::from_app(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(f.area());

    let header: Vec<Line> = view.header_lines.iter().map(|l| Line::from(l.as_str())).collect();
    f.render_widget(Paragraph::new(header).block(panel_block("Jukebox")), chunks[0]);

    app.volume_area = draw_now_playing(f, &view.now_playing, chunks[1]);
    app.track_list_area = draw_tracks(f, app, &view.tracks, chunks[2]);

    let footer = vec![
        Line::from(view.status_line.as_str()),
        Line::from(Span::styled(
            view.keys_line.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(footer).block(panel_block("Status")), chunks[3]);

    if let Some(modal) = view.active_modal.as_ref() {
        draw_modal(f, app, modal);
    }

    if let Some(message) = view.loading.as_deref() {
        let area = centered_rect(40, 20, f.area());
        f.render_widget(Clear, area);
        let body = Paragraph::new(vec![Line::from(""), Line::from(message)])
            .alignment(Alignment::Center)
            .block(panel_block("Please wait"));
        f.render_widget(body, area);
    }
}

/// Draw the now-playing panel and return the gauge area for click handling.
fn draw_now_playing(f: &mut Frame, view: &NowPlayingView, area: Rect) -> Rect {
    let block = panel_block("Now Playing");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let title = Line::from(vec![
        Span::raw(format!("{} ", view.playback_icon.glyph())),
        Span::styled(
            view.track_name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(title), rows[0]);
    let info = Line::from(vec![
        Span::styled(
            format!("{:<9}", view.playback_label),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(view.track_info.as_str(), Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(info), rows[1]);

    let volume_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(3), Constraint::Min(10)])
        .split(rows[2]);
    f.render_widget(Paragraph::new(view.volume_icon.glyph()), volume_row[0]);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(f64::from(view.volume_pct) / 100.0)
        .label(view.volume_label.clone());
    f.render_widget(gauge, volume_row[1]);
    volume_row[1]
}

/// Draw the track list and return the inner area of its rows for click handling.
fn draw_tracks(f: &mut Frame, app: &mut App, view: &TrackListView, area: Rect) -> Rect {
    match view {
        TrackListView::Empty { placeholder } => {
            let body = Paragraph::new(vec![Line::from(""), Line::from(placeholder.as_str())])
                .alignment(Alignment::Center)
                .block(panel_block("Tracks"));
            f.render_widget(body, area);
            Rect::default()
        }
        TrackListView::Rows(rows) => {
            let title = format!("Tracks ({})", rows.len());
            let items: Vec<ListItem> = rows
                .iter()
                .map(|row| {
                    let style = if row.current {
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let marker = if row.current { "♪ " } else { "  " };
                    ListItem::new(Line::from(vec![
                        Span::styled(marker, style),
                        Span::styled(row.label.as_str(), style),
                    ]))
                })
                .collect();
            let inner = panel_block(&title).inner(area);
            let list = list_panel(&title, items, true);
            f.render_stateful_widget(list, area, &mut app.list_state);
            inner
        }
    }
}

fn draw_modal(f: &mut Frame, app: &App, modal: &UiModal) {
    match modal {
        UiModal::Alert { title, body, layout } => {
            let area = centered_rect(layout.width_pct, layout.height_pct, f.area());
            f.render_widget(Clear, area);
            let lines: Vec<Line> = body
                .lines()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Red))))
                .collect();
            f.render_widget(modal_text(title, lines), area);
        }
        UiModal::Directory {
            title,
            input,
            hint,
            layout,
        } => {
            let area = centered_rect(layout.width_pct, layout.height_pct, f.area());
            f.render_widget(Clear, area);
            let lines = vec![
                Line::from(vec![
                    Span::styled(input.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled("▏", Style::default().fg(Color::Yellow)),
                ]),
                Line::from(""),
                Line::from(Span::styled(hint.as_str(), Style::default().fg(Color::DarkGray))),
            ];
            f.render_widget(modal_text(title, lines), area);
        }
        UiModal::Help {
            title,
            body,
            layout,
        } => {
            let area = centered_rect(layout.width_pct, layout.height_pct, f.area());
            f.render_widget(Clear, area);
            let lines: Vec<Line> = body.lines().map(Line::from).collect();
            f.render_widget(modal_text(title, lines), area);
        }
        UiModal::Logs {
            title,
            empty,
            layout,
        } => {
            let area = centered_rect(layout.width_pct, layout.height_pct, f.area());
            f.render_widget(Clear, area);
            let inner = panel_block(title).inner(area);
            let height = inner.height as usize;
            let total = app.logs.len();
            let end = total.saturating_sub(app.logs_scroll);
            let start = end.saturating_sub(height);
            let mut items: Vec<ListItem> = app
                .logs
                .iter()
                .skip(start)
                .take(end.saturating_sub(start))
                .map(|line| ListItem::new(line.as_str()))
                .collect();
            if *empty {
                items.push(ListItem::new("<no logs>"));
            }
            f.render_widget(list_panel(title, items, false), area);
        }
    }
}
