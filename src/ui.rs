//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, MarkerRow, PlaybackState};
use crate::config::{ControlsSettings, UiSettings};
use crate::geo::distance_meters;
use crate::playback::MarkerDetails;
use crate::venue::GateDecision;

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[enter] details".to_string(),
        "[esc] close".to_string(),
        "[p] now playing".to_string(),
        "[space] pause".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[m] mock mode".to_string(),
        "[t] teleport".to_string(),
        "[arrows] move mock".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_distance(d: Option<u64>) -> String {
    match d {
        Some(m) if m >= 1000 => format!("{:.1} km", m as f64 / 1000.0),
        Some(m) => format!("{m} m"),
        None => "-".to_string(),
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn header_text<'a>(app: &'a App, ui: &'a UiSettings) -> &'a str {
    if ui.header_text.trim().is_empty() {
        app.info.display_title()
    } else {
        ui.header_text.as_str()
    }
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!("LOCATION: {}", app.mode_label()));
    match app.current_location() {
        Some(loc) => {
            let mut p = format!("At: {}", loc.coordinate);
            if let Some(acc) = loc.accuracy {
                p.push_str(&format!(" (±{acc:.0} m)"));
            }
            parts.push(p);
        }
        None => parts.push("At: waiting for a fix".to_string()),
    }

    // now playing
    if let Some(marker) = app.active_marker() {
        let mut song = format!("Track: {} - {}", marker.artist_name, marker.track_title);
        if let Some(ref h) = app.playback_handle {
            if let Ok(info) = h.lock() {
                if info.marker == Some(marker.id) {
                    let time = match info.total {
                        Some(t) => format!("{} / {}", format_mmss(info.elapsed), format_mmss(t)),
                        None => format_mmss(info.elapsed),
                    };
                    song.push_str(&format!(" [{time}]"));
                }
            }
        }
        parts.push(song);
        parts.push(
            match app.playback {
                PlaybackState::Playing => "Playing",
                PlaybackState::Paused => "Paused",
                PlaybackState::Stopped => "Stopped",
            }
            .to_string(),
        );
    } else {
        parts.push("No track in range".to_string());
    }

    if let Some(GateDecision::FailOpen(reason)) = &app.gate {
        parts.push(format!("Venue check skipped: {reason}"));
    }
    if app.load_issues > 0 {
        parts.push(format!("{} event records ignored", app.load_issues));
    }

    parts.join(" • ")
}

fn row_item(row: &MarkerRow, show_distances: bool) -> ListItem<'static> {
    let flag = if row.active {
        "♪"
    } else if row.in_range {
        "•"
    } else {
        " "
    };
    let mut text = format!("{flag} {} - {}", row.artist, row.title);
    if show_distances {
        text.push_str(&format!("  ({})", format_distance(row.distance_m)));
    }
    let item = ListItem::new(text);
    if row.active {
        item.style(Style::default().add_modifier(Modifier::BOLD))
    } else if !row.in_range {
        item.style(Style::default().add_modifier(Modifier::DIM))
    } else {
        item
    }
}

fn details_text(d: &MarkerDetails) -> String {
    let range = if d.in_range {
        "In range".to_string()
    } else {
        format!("Out of range (within {:.0} m to listen)", d.threshold_m)
    };
    let audio = if d.playable {
        "Audio: available ([space] pause/resume)"
    } else {
        "Audio: walk closer to listen"
    };
    let mut text = format!(
        "Title: {}\nArtist: {}\nDistance: {}\n{}\n{}",
        d.track_title,
        d.artist_name,
        format_distance(d.distance_m),
        range,
        audio
    );
    if let Some(icon) = d.icon_url.as_deref() {
        text.push_str(&format!("\nIcon: {icon}"));
    }
    text
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    if app.is_outside_venue() {
        draw_outside_venue(frame, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());
    // Header
    let header = Paragraph::new(header_text(app, ui_settings))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" earshot ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box; the advisory goes on top so it is never wrapped away.
    let mut status = status_text(app);
    if let Some(advisory) = app.advisory() {
        status = format!("{advisory}\n{status}");
    }
    let status_par = Paragraph::new(status)
        .block(Block::bordered().padding(LEFT_PAD).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Marker list
    {
        let rows = app.marker_rows();
        let items: Vec<ListItem> = rows
            .iter()
            .map(|r| row_item(r, ui_settings.show_distances))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" markers "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if app.has_markers() {
            state.select(Some(app.selected));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Overlay details popup (keeps list visible under it)
    if let Some(details) = app.open_details() {
        let list_area = chunks[2];
        let popup_area = centered_rect_sized(64, 10, list_area);
        frame.render_widget(Clear, popup_area);

        let popup = Paragraph::new(details_text(&details))
            .block(
                Block::default()
                    .padding(LEFT_PAD)
                    .borders(Borders::ALL)
                    .title(format!(" marker {} (esc closes) ", details.id)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(popup, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}

/// The screen shown when the entry check put the visitor outside the venue.
fn draw_outside_venue(frame: &mut Frame, app: &App) {
    let area = centered_rect_sized(70, 14, frame.area());
    let mut text = format!(
        "You are not at {} yet.\n\nThis experience only works on site.",
        app.info.name
    );
    let page = &app.info.page;
    if let Some(desc) = page.description.as_deref().or(app.info.description.as_deref()) {
        text.push_str("\n\n");
        text.push_str(desc);
    }
    if let Some(GateDecision::Outside(loc)) = &app.gate {
        text.push_str(&format!("\n\nYour position: {}", loc.coordinate));
        if let Some(center) = app.venue_center {
            let d = distance_meters(loc.coordinate, center).round() as u64;
            text.push_str(&format!("\nVenue center: {}", format_distance(Some(d))));
        }
    }
    let retry = page.button_title.as_deref().unwrap_or("check again");
    text.push_str(&format!("\n\n[r] {retry} | [q] quit"));

    let par = Paragraph::new(text)
        .alignment(Alignment::Center)
        .bold()
        .block(
            Block::bordered()
                .title(" outside the venue ")
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(par, area);
}
