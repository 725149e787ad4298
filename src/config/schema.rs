use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geo::DEFAULT_PROXIMITY_THRESHOLD_M;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/earshot/config.toml` or `~/.config/earshot/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `EARSHOT__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub proximity: ProximitySettings,
    pub location: LocationSettings,
    pub venue: VenueSettings,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub event: EventSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProximitySettings {
    /// Distance (meters) at which a marker's track becomes playable.
    pub threshold_m: f64,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            threshold_m: DEFAULT_PROXIMITY_THRESHOLD_M,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationSettings {
    /// Whether the session starts on the live feed or on the mock point.
    pub mode: LocationModeSetting,
    pub high_accuracy: bool,
    /// How long to wait for a fix before reporting a timeout (milliseconds).
    pub timeout_ms: u64,
    /// Oldest cached fix that may still be delivered (milliseconds).
    pub maximum_age_ms: u64,

    /// Position feed to read fixes from: a device node, a pipe or a
    /// recorded walk. Without one, live location is unsupported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<PathBuf>,
    /// Delay between replayed feed lines (milliseconds).
    pub feed_interval_ms: u64,

    pub mock_latitude: f64,
    pub mock_longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_accuracy: Option<f64>,
    /// Distance an arrow key moves the mock point (meters).
    pub mock_step_m: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            mode: LocationModeSetting::Live,
            high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 60_000,
            feed: None,
            feed_interval_ms: 1_000,
            mock_latitude: 0.0,
            mock_longitude: 0.0,
            mock_accuracy: None,
            mock_step_m: 2.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationModeSetting {
    #[serde(alias = "device", alias = "gps")]
    Live,
    #[serde(alias = "manual", alias = "fake")]
    Mock,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VenueSettings {
    /// Check the visitor against the venue boundary at startup.
    pub gate: bool,
    /// How long the entry check waits for a fix (milliseconds).
    pub gate_timeout_ms: u64,
}

impl Default for VenueSettings {
    fn default() -> Self {
        Self {
            gate: true,
            gate_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// Text rendered inside the top header box. Empty means the event title.
    pub header_text: String,
    /// Show the distance to every marker in the list.
    pub show_distances: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: String::new(),
            show_distances: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EventSettings {
    /// Event document to load when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file. Defaults to `earshot.log` in the temp directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            path: None,
            filter: "info".to_string(),
        }
    }
}
