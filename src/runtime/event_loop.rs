use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Nudge, PlaybackState};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::config;
use crate::location::{LocationMode, LocationProvider, LocationSource};
use crate::playback::command_for;
use crate::proximity::TrackChange;
use crate::ui;
use crate::venue::VenueRegion;

use super::startup::check_venue;

/// Everything the loop drives besides the app model.
pub struct Session<'a, P: LocationProvider> {
    pub settings: &'a config::Settings,
    pub source: LocationSource<P>,
    pub audio_player: &'a AudioPlayer,
    pub venue: Option<&'a VenueRegion>,
}

impl<P: LocationProvider> Session<'_, P> {
    fn send_change(&self, change: &TrackChange) {
        let _ = self.audio_player.send(command_for(change));
    }

    /// Drain location updates, running each one through the coordinator in
    /// arrival order, then settle on the source's latest snapshot.
    fn sync_location(&mut self, app: &mut App) {
        let mut changes: Vec<TrackChange> = Vec::new();
        self.source.poll_with(|snap| {
            if let Some(c) = app.apply_location(snap) {
                changes.push(c);
            }
        });
        if let Some(c) = app.apply_location(self.source.snapshot()) {
            changes.push(c);
        }
        for c in &changes {
            self.send_change(c);
        }
    }

    fn start_location(&mut self, app: &mut App) {
        self.source.start();
        self.sync_location(app);
    }
}

/// Main terminal event loop: handles input, UI drawing and sync with the
/// location source and the audio thread. Returns `Ok(())` when shutdown is
/// requested.
pub fn run<P: LocationProvider>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    session: &mut Session<'_, P>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !app.is_outside_venue() {
        session.start_location(app);
    }

    loop {
        if !app.is_outside_venue() {
            session.sync_location(app);
        }
        app.sync_playback();

        terminal.draw(|f| ui::draw(f, app, &session.settings.ui, &session.settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, session)? {
                    break;
                }
            }
        }
    }

    // Leaving the map releases the live subscription before audio winds down.
    session.source.stop();
    Ok(())
}

fn handle_key_event<P: LocationProvider>(
    key: KeyEvent,
    app: &mut App,
    session: &mut Session<'_, P>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let settings = session.settings;

    if let KeyCode::Char('q') = key.code {
        session
            .audio_player
            .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
        return Ok(true);
    }

    if app.is_outside_venue() {
        if let KeyCode::Char('r') = key.code {
            if let Some(decision) = check_venue(session.source.provider(), session.venue, settings)
            {
                app.set_gate(decision);
            } else {
                app.gate = None;
            }
            if !app.is_outside_venue() {
                session.start_location(app);
            }
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('j') => app.next(),
        KeyCode::Char('k') => app.prev(),
        KeyCode::Enter => app.tap_cursor_marker(),
        KeyCode::Esc => app.close_details(),
        KeyCode::Char('p') => {
            app.tap_player();
        }
        KeyCode::Char(' ') => {
            if app.playback != PlaybackState::Stopped {
                let _ = session.audio_player.send(AudioCmd::TogglePause);
            }
        }
        KeyCode::Char('L') => {
            let secs = settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;
            let _ = session.audio_player.send(AudioCmd::SeekBy(secs));
        }
        KeyCode::Char('H') => {
            let secs = settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;
            let _ = session.audio_player.send(AudioCmd::SeekBy(-secs));
        }
        KeyCode::Char('m') => {
            let mode = match session.source.mode() {
                LocationMode::Live => LocationMode::Mock,
                LocationMode::Mock => LocationMode::Live,
            };
            session.source.set_mode(mode);
            session.sync_location(app);
        }
        KeyCode::Char('t') => {
            if let Some(target) = app.cursor_location() {
                session.source.set_mock_value(target);
                if session.source.mode() != LocationMode::Mock {
                    session.source.set_mode(LocationMode::Mock);
                }
                session.sync_location(app);
            }
        }
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
            let nudge = match key.code {
                KeyCode::Up => Nudge::North,
                KeyCode::Down => Nudge::South,
                KeyCode::Left => Nudge::West,
                _ => Nudge::East,
            };
            let moved = nudge.apply(session.source.mock_value(), settings.location.mock_step_m);
            session.source.set_mock_value(moved);
            session.sync_location(app);
        }
        _ => {}
    }

    Ok(false)
}
