//! Audio-related small types and handles.
//!
//! This module defines the commands accepted by the audio thread and the
//! playback info it shares with the UI.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::event::MarkerId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCmd {
    /// Tear down the current track, then start the marker's track.
    Play(MarkerId),
    /// Stop playback immediately.
    Stop,
    /// Toggle pause/resume.
    TogglePause,
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Runtime playback information shared with the UI.
pub struct PlaybackInfo {
    /// Marker whose track is loaded (if any).
    pub marker: Option<MarkerId>,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Track length, when the file's metadata reports one.
    pub total: Option<Duration>,
    /// Whether playback is currently active.
    pub playing: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
