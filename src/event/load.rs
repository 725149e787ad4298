use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::geo::Coordinate;
use crate::venue::VenueRegion;

use super::schema::{AudioSource, EventData, EventError, EventInfo, Marker, MarkerId, PageInfo};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarker {
    track_title: String,
    artist_name: String,
    latitude: f64,
    longitude: f64,
    audio_url: String,
    #[serde(default)]
    icon_url: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawPage {
    title: Option<String>,
    description: Option<String>,
    button_title: Option<String>,
}

impl EventData {
    /// Read and validate the event document at `path`.
    ///
    /// Relative audio paths are resolved against the directory holding the file.
    pub fn load(path: &Path) -> Result<Self, EventError> {
        let text = fs::read_to_string(path).map_err(|source| EventError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&text, base_dir)
    }

    /// Parse an event document. Fails only when the document as a whole is
    /// unusable; individual bad records are dropped and listed in `issues`.
    pub fn from_json(text: &str, base_dir: &Path) -> Result<Self, EventError> {
        let root: Value = serde_json::from_str(text)?;
        let mut issues = Vec::new();

        let info = parse_event_info(&root, &mut issues)?;

        let coords = root
            .get("venue")
            .filter(|v| v.is_object())
            .and_then(|v| v.get("coords"))
            .and_then(Value::as_array);
        if coords.is_none() {
            issues.push(EventError::ConfigurationInvalid(
                "venue.coords must be an array".into(),
            ));
        }

        let points: Vec<Coordinate> = coords
            .into_iter()
            .flatten()
            .enumerate()
            .filter_map(|(i, raw)| match parse_coordinate_pair(raw) {
                Some(c) => Some(c),
                None => {
                    issues.push(EventError::ConfigurationInvalid(format!(
                        "venue.coords[{i}] is not a valid [lat, lng] pair: {raw}"
                    )));
                    None
                }
            })
            .collect();

        let venue = match VenueRegion::new(points) {
            Ok(region) => Some(region),
            Err(_) if coords.is_none() => None,
            Err(e) => {
                issues.push(EventError::ConfigurationInvalid(format!("venue: {e}")));
                None
            }
        };

        let mut markers = Vec::new();
        if let Some(raw_markers) = root.get("markerData") {
            match raw_markers.as_array() {
                Some(list) => {
                    for (i, raw) in list.iter().enumerate() {
                        match parse_marker(raw, MarkerId(markers.len()), base_dir) {
                            Ok(m) => {
                                tracing::debug!(marker = %m.id, audio = %m.audio, "marker loaded");
                                markers.push(m);
                            }
                            Err(reason) => issues.push(EventError::ConfigurationInvalid(format!(
                                "markerData[{i}] dropped: {reason}"
                            ))),
                        }
                    }
                }
                None if raw_markers.is_null() => {}
                None => issues.push(EventError::ConfigurationInvalid(
                    "markerData must be an array".into(),
                )),
            }
        }

        for issue in &issues {
            tracing::warn!("{issue}");
        }
        tracing::info!(
            event = %info.id,
            markers = markers.len(),
            venue = venue.is_some(),
            dropped = issues.len(),
            "event data loaded"
        );

        Ok(Self {
            info,
            venue,
            markers,
            issues,
        })
    }
}

fn parse_event_info(root: &Value, issues: &mut Vec<EventError>) -> Result<EventInfo, EventError> {
    let event = root
        .get("event")
        .filter(|v| v.is_object())
        .ok_or_else(|| EventError::Invalid("missing `event` object".into()))?;

    let id = event
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| EventError::Invalid("event.id must be a string".into()))?;
    let name = event
        .get("eventName")
        .and_then(Value::as_str)
        .ok_or_else(|| EventError::Invalid("event.eventName must be a string".into()))?;

    let description = event
        .get("eventDescription")
        .and_then(Value::as_str)
        .map(str::to_string);

    let page = match event.get("page") {
        None | Some(Value::Null) => RawPage::default(),
        Some(raw) => RawPage::deserialize(raw).unwrap_or_else(|e| {
            issues.push(EventError::ConfigurationInvalid(format!("event.page ignored: {e}")));
            RawPage::default()
        }),
    };

    Ok(EventInfo {
        id: id.to_string(),
        name: name.to_string(),
        description,
        page: PageInfo {
            title: page.title,
            description: page.description,
            button_title: page.button_title,
        },
    })
}

fn parse_coordinate_pair(raw: &Value) -> Option<Coordinate> {
    match raw.as_array()?.as_slice() {
        [lat, lng] => Coordinate::new(lat.as_f64()?, lng.as_f64()?).ok(),
        _ => None,
    }
}

fn parse_marker(raw: &Value, id: MarkerId, base_dir: &Path) -> Result<Marker, String> {
    let m = RawMarker::deserialize(raw).map_err(|e| e.to_string())?;
    let coordinate = Coordinate::new(m.latitude, m.longitude).map_err(|e| e.to_string())?;
    if m.audio_url.trim().is_empty() {
        return Err("audioUrl is empty".into());
    }

    Ok(Marker {
        id,
        track_title: m.track_title,
        artist_name: m.artist_name,
        coordinate,
        audio: resolve_audio(&m.audio_url, base_dir),
        icon_url: m.icon_url.filter(|s| !s.trim().is_empty()),
    })
}

/// Map an `audioUrl` to something the audio thread can open.
///
/// `http(s)://` stays remote. `file://` and existing absolute paths are used
/// as-is; anything else (including web-root paths like `/audio/a.mp3`) is
/// resolved under `base_dir`.
pub fn resolve_audio(url: &str, base_dir: &Path) -> AudioSource {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return AudioSource::Remote(url.to_string());
    }

    let raw = url.strip_prefix("file://").unwrap_or(url);
    let path = Path::new(raw);
    if path.is_absolute() && path.exists() {
        return AudioSource::File(path.to_path_buf());
    }
    AudioSource::File(base_dir.join(raw.trim_start_matches('/')))
}
