use crate::audio::AudioCmd;
use crate::event::{Marker, MarkerId};
use crate::geo::{UserLocation, is_within_threshold};
use crate::proximity::{ChangeGate, TrackChange, active_marker, distance_to};

/// What the details view shows for one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDetails {
    pub id: MarkerId,
    pub track_title: String,
    pub artist_name: String,
    pub icon_url: Option<String>,
    pub in_range: bool,
    /// Rounded to whole meters; `None` while the location is unknown.
    pub distance_m: Option<u64>,
    pub threshold_m: f64,
    /// Only the active track offers audio controls.
    pub playable: bool,
}

#[derive(Debug)]
pub struct PlaybackCoordinator {
    threshold_m: f64,
    gate: ChangeGate,
    selected: Option<MarkerId>,
    details_open: bool,
}

impl PlaybackCoordinator {
    pub fn new(threshold_m: f64) -> Self {
        Self {
            threshold_m,
            gate: ChangeGate::default(),
            selected: None,
            details_open: false,
        }
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    pub fn active_track(&self) -> Option<MarkerId> {
        self.gate.current()
    }

    pub fn selected_marker(&self) -> Option<MarkerId> {
        self.selected
    }

    pub fn details_open(&self) -> bool {
        self.details_open
    }

    /// Re-run the reducer. Returns the change only when the active track
    /// actually moved, so repeated fixes inside one range are silent.
    pub fn on_location_or_markers_changed(
        &mut self,
        location: Option<&UserLocation>,
        markers: &[Marker],
    ) -> Option<TrackChange> {
        let result = active_marker(location, markers, self.threshold_m);
        let change = self.gate.observe(result)?;
        tracing::debug!(
            previous = ?change.previous,
            current = ?change.current,
            "active track changed"
        );
        Some(change)
    }

    /// Select `marker` and open its details, whether or not it is in range.
    pub fn on_marker_tapped(&mut self, marker: &Marker) {
        self.selected = Some(marker.id);
        self.details_open = true;
    }

    /// Route a tap on the now-playing bar into the active marker's details.
    /// Returns false when nothing is playing.
    pub fn on_player_tapped(&mut self) -> bool {
        match self.active_track() {
            Some(id) => {
                self.selected = Some(id);
                self.details_open = true;
                true
            }
            None => false,
        }
    }

    pub fn close_details(&mut self) {
        self.details_open = false;
    }

    /// Details for the selected marker, recomputed against `location`.
    pub fn details(
        &self,
        location: Option<&UserLocation>,
        markers: &[Marker],
    ) -> Option<MarkerDetails> {
        let marker = markers.get(self.selected?.0)?;
        let in_range = location
            .is_some_and(|l| is_within_threshold(l.coordinate, marker.coordinate, self.threshold_m));
        Some(MarkerDetails {
            id: marker.id,
            track_title: marker.track_title.clone(),
            artist_name: marker.artist_name.clone(),
            icon_url: marker.icon_url.clone(),
            in_range,
            distance_m: distance_to(location, marker).map(|d| d.round() as u64),
            threshold_m: self.threshold_m,
            playable: self.active_track() == Some(marker.id),
        })
    }
}

/// The audio command that realizes `change`.
pub fn command_for(change: &TrackChange) -> AudioCmd {
    match change.current {
        Some(id) => AudioCmd::Play(id),
        None => AudioCmd::Stop,
    }
}
