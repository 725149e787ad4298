//! Location-related small types shared by providers and the source.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::geo::UserLocation;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LocationMode {
    /// Follow the device's position stream.
    Live,
    /// Use the manually configured mock location.
    Mock,
}

impl Default for LocationMode {
    fn default() -> Self {
        Self::Live
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location access denied by user.")]
    PermissionDenied,
    #[error("Location information is unavailable.")]
    Unavailable,
    #[error("Location request timed out.")]
    Timeout,
    #[error("Location is not supported on this device.")]
    Unsupported,
}

impl LocationError {
    /// Classify an I/O failure from a position feed.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Unavailable,
        }
    }
}

/// Acquisition options handed to a provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// How long to wait for a fix before reporting `Timeout`.
    pub timeout: Duration,
    /// Cached fixes younger than this may be reused.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
        }
    }
}

/// Identifies one live subscription. Messages from older subscriptions are stale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Fix(UserLocation),
    Error(LocationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationMessage {
    pub subscription: SubscriptionId,
    pub event: LocationEvent,
}

/// Read-only view of the source handed to the presentation layer.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LocationSnapshot {
    pub mode: LocationMode,
    pub current: Option<UserLocation>,
    pub error: Option<LocationError>,
    /// A live subscription is outstanding.
    pub watching: bool,
}
