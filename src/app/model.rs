//! Application model types: `App`, `PlaybackState` and the marker list rows.
//!
//! The `App` struct holds the loaded event, the latest location snapshot and
//! the playback coordinator. It never talks to the location source or the
//! audio thread itself; the runtime feeds it and acts on what it returns.

use crate::audio::PlaybackHandle;
use crate::event::{EventInfo, Marker};
use crate::geo::{Coordinate, UserLocation};
use crate::location::{LocationMode, LocationSnapshot};
use crate::playback::{MarkerDetails, PlaybackCoordinator};
use crate::proximity::{TrackChange, distance_to, markers_in_range};
use crate::venue::GateDecision;

/// The playback state of the application.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// One line of the marker list.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRow {
    pub title: String,
    pub artist: String,
    pub in_range: bool,
    pub distance_m: Option<u64>,
    /// This marker's track is the active one.
    pub active: bool,
}

/// Direction for moving the mock location by hand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Nudge {
    North,
    South,
    East,
    West,
}

impl Nudge {
    /// `location` moved `step_m` meters in this direction. Accuracy is kept.
    pub fn apply(self, location: UserLocation, step_m: f64) -> UserLocation {
        let (north, east) = match self {
            Nudge::North => (step_m, 0.0),
            Nudge::South => (-step_m, 0.0),
            Nudge::East => (0.0, step_m),
            Nudge::West => (0.0, -step_m),
        };
        UserLocation::new(
            location.coordinate.offset_meters(north, east),
            location.accuracy,
        )
    }
}

/// The main application model.
pub struct App {
    pub info: EventInfo,
    pub markers: Vec<Marker>,
    /// Cursor position in `markers`.
    pub selected: usize,
    pub location: LocationSnapshot,
    pub coordinator: PlaybackCoordinator,
    pub playback: PlaybackState,
    pub playback_handle: Option<PlaybackHandle>,
    pub gate: Option<GateDecision>,
    pub venue_center: Option<Coordinate>,
    /// Number of records dropped while loading the event.
    pub load_issues: usize,
}

impl App {
    /// Create a new `App` for `markers`, considered in range within `threshold_m`.
    pub fn new(info: EventInfo, markers: Vec<Marker>, threshold_m: f64) -> Self {
        Self {
            info,
            markers,
            selected: 0,
            location: LocationSnapshot::default(),
            coordinator: PlaybackCoordinator::new(threshold_m),
            playback: PlaybackState::Stopped,
            playback_handle: None,
            gate: None,
            venue_center: None,
            load_issues: 0,
        }
    }

    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    pub fn set_gate(&mut self, decision: GateDecision) {
        self.gate = Some(decision);
    }

    /// True when the entry check located the visitor outside the venue.
    pub fn is_outside_venue(&self) -> bool {
        self.gate.as_ref().is_some_and(|g| !g.admits())
    }

    /// Return true if the event has any markers.
    pub fn has_markers(&self) -> bool {
        !self.markers.is_empty()
    }

    /// Move the cursor to the next marker, wrapping to the first.
    pub fn next(&mut self) {
        if self.has_markers() {
            self.selected = (self.selected + 1) % self.markers.len();
        }
    }

    /// Move the cursor to the previous marker, wrapping to the last.
    pub fn prev(&mut self) {
        if self.has_markers() {
            self.selected = match self.selected {
                0 => self.markers.len() - 1,
                n => n - 1,
            };
        }
    }

    pub fn cursor_marker(&self) -> Option<&Marker> {
        self.markers.get(self.selected)
    }

    pub fn current_location(&self) -> Option<&UserLocation> {
        self.location.current.as_ref()
    }

    /// Store `snapshot` and re-run the coordinator against it.
    pub fn apply_location(&mut self, snapshot: LocationSnapshot) -> Option<TrackChange> {
        self.location = snapshot;
        let change = self
            .coordinator
            .on_location_or_markers_changed(snapshot.current.as_ref(), &self.markers);
        if let Some(c) = change {
            if c.current.is_none() {
                self.playback = PlaybackState::Stopped;
            }
        }
        change
    }

    pub fn marker_rows(&self) -> Vec<MarkerRow> {
        let location = self.current_location();
        let in_range = markers_in_range(location, &self.markers, self.coordinator.threshold_m());
        let active = self.coordinator.active_track();
        self.markers
            .iter()
            .zip(in_range)
            .map(|(m, in_range)| MarkerRow {
                title: m.track_title.clone(),
                artist: m.artist_name.clone(),
                in_range,
                distance_m: distance_to(location, m).map(|d| d.round() as u64),
                active: active == Some(m.id),
            })
            .collect()
    }

    /// Open details for the marker under the cursor.
    pub fn tap_cursor_marker(&mut self) {
        if let Some(m) = self.markers.get(self.selected) {
            self.coordinator.on_marker_tapped(m);
        }
    }

    /// Open details for the active track and move the cursor onto it.
    pub fn tap_player(&mut self) -> bool {
        if !self.coordinator.on_player_tapped() {
            return false;
        }
        if let Some(id) = self.coordinator.selected_marker() {
            self.selected = id.0;
        }
        true
    }

    pub fn close_details(&mut self) {
        self.coordinator.close_details();
    }

    /// Details of the selected marker while the details view is open.
    pub fn open_details(&self) -> Option<MarkerDetails> {
        if !self.coordinator.details_open() {
            return None;
        }
        self.coordinator
            .details(self.current_location(), &self.markers)
    }

    pub fn active_marker(&self) -> Option<&Marker> {
        self.markers.get(self.coordinator.active_track()?.0)
    }

    /// The cursor marker's position, as a mock location to teleport to.
    pub fn cursor_location(&self) -> Option<UserLocation> {
        self.cursor_marker().map(|m| m.coordinate.into())
    }

    /// Advisory text for the status line when location is degraded.
    pub fn advisory(&self) -> Option<String> {
        let e = self.location.error?;
        Some(format!("{e} Using the mock location instead."))
    }

    /// Refresh `playback` from the audio thread's shared info.
    pub fn sync_playback(&mut self) {
        let Some(h) = self.playback_handle.as_ref() else {
            return;
        };
        if let Ok(info) = h.lock() {
            self.playback = match (info.marker, info.playing) {
                (None, _) => PlaybackState::Stopped,
                (Some(_), true) => PlaybackState::Playing,
                (Some(_), false) => PlaybackState::Paused,
            };
        }
    }

    pub fn mode_label(&self) -> &'static str {
        match (self.location.mode, self.location.watching) {
            (LocationMode::Live, true) => "Live",
            (LocationMode::Live, false) => "Live (no position feed)",
            (LocationMode::Mock, _) => "Mock",
        }
    }
}
