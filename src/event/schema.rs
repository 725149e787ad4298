use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::geo::Coordinate;
use crate::venue::VenueRegion;

/// Stable identity of a marker: its position in the validated marker list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub usize);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stationary point of interest with its audio track.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub track_title: String,
    pub artist_name: String,
    pub coordinate: Coordinate,
    pub audio: AudioSource,
    pub icon_url: Option<String>,
}

/// Where a marker's audio lives after resolving `audioUrl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    File(PathBuf),
    Remote(String),
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSource::File(p) => write!(f, "{}", p.display()),
            AudioSource::Remote(url) => f.write_str(url),
        }
    }
}

/// Landing page text from the `event.page` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub button_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub page: PageInfo,
}

impl EventInfo {
    /// The title shown in headers: the page title if set, else the event name.
    pub fn display_title(&self) -> &str {
        self.page.title.as_deref().unwrap_or(&self.name)
    }
}

/// Everything loaded from the event document.
#[derive(Debug)]
pub struct EventData {
    pub info: EventInfo,
    /// `None` when the configured polygon has fewer than three valid points.
    pub venue: Option<VenueRegion>,
    pub markers: Vec<Marker>,
    /// Records that were dropped while loading.
    pub issues: Vec<EventError>,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to read event file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("event file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document is missing a required top-level field.
    #[error("invalid event document: {0}")]
    Invalid(String),

    /// A single record was malformed and dropped.
    #[error("configuration invalid: {0}")]
    ConfigurationInvalid(String),
}
