use std::time::Duration;
use std::{env, path::PathBuf};

use crate::geo::{Coordinate, GeoError, UserLocation};
use crate::location::{LocationMode, PositionOptions};

use super::schema::{LocationModeSetting, LocationSettings, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `EARSHOT__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("EARSHOT")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let t = self.proximity.threshold_m;
        if !t.is_finite() || t <= 0.0 {
            return Err("proximity.threshold_m must be a positive number".to_string());
        }
        if self.location.timeout_ms == 0 {
            return Err("location.timeout_ms must be >= 1".to_string());
        }
        if self.venue.gate_timeout_ms == 0 {
            return Err("venue.gate_timeout_ms must be >= 1".to_string());
        }
        let step = self.location.mock_step_m;
        if !step.is_finite() || step <= 0.0 {
            return Err("location.mock_step_m must be a positive number".to_string());
        }
        if let Some(acc) = self.location.mock_accuracy {
            if !acc.is_finite() || acc < 0.0 {
                return Err("location.mock_accuracy must be >= 0".to_string());
            }
        }
        self.location
            .mock_location()
            .map_err(|e| format!("location.mock_latitude/mock_longitude: {e}"))?;
        Ok(())
    }

    /// Settings to run with. A config file or environment that cannot be
    /// read or fails `validate` is ignored as a whole; the reason comes back
    /// alongside the defaults so it can be reported.
    pub fn load_or_default() -> (Self, Option<String>) {
        let checked = Self::load()
            .map_err(|e| format!("cannot read settings: {e}"))
            .and_then(|s| match s.validate() {
                Ok(()) => Ok(s),
                Err(msg) => Err(format!("rejected settings: {msg}")),
            });
        match checked {
            Ok(s) => (s, None),
            Err(reason) => (Self::default(), Some(reason)),
        }
    }

    /// Effective settings as TOML, for `--dump-config`.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl LocationSettings {
    pub fn initial_mode(&self) -> LocationMode {
        match self.mode {
            LocationModeSetting::Live => LocationMode::Live,
            LocationModeSetting::Mock => LocationMode::Mock,
        }
    }

    /// Options for the continuous watch.
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }

    pub fn mock_location(&self) -> Result<UserLocation, GeoError> {
        let coordinate = Coordinate::new(self.mock_latitude, self.mock_longitude)?;
        Ok(UserLocation::new(coordinate, self.mock_accuracy))
    }
}

/// Resolve the config path from `EARSHOT_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("EARSHOT_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/earshot/config.toml`
/// or `~/.config/earshot/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("earshot").join("config.toml"))
}
