use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::config;
use crate::location::{LocationProvider, PositionOptions};
use crate::venue::{GateDecision, VenueRegion, check_entry};

const DEFAULT_EVENT_FILE: &str = "eventConfig.json";

pub const USAGE: &str = "usage: earshot [--dump-config] [EVENT_FILE]";

/// Command line: an optional event file and a few flags.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub event_path: Option<PathBuf>,
    pub dump_config: bool,
    pub help: bool,
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, String> {
    let mut out = CliArgs::default();
    for arg in args {
        match arg.as_str() {
            "--dump-config" => out.dump_config = true,
            "-h" | "--help" => out.help = true,
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option '{flag}'\n{USAGE}"));
            }
            _ if out.event_path.is_some() => {
                return Err(format!("unexpected argument '{arg}'\n{USAGE}"));
            }
            _ => out.event_path = Some(PathBuf::from(arg)),
        }
    }
    Ok(out)
}

/// Command line wins over `event.path`; otherwise `eventConfig.json` in the
/// working directory.
pub fn event_path(args: &CliArgs, settings: &config::Settings) -> PathBuf {
    args.event_path
        .clone()
        .or_else(|| settings.event.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EVENT_FILE))
}

/// Send `tracing` output to the log file so it does not tear up the TUI.
pub fn init_logging(log: &config::LogSettings) -> io::Result<PathBuf> {
    let path = log
        .path
        .clone()
        .unwrap_or_else(|| env::temp_dir().join("earshot.log"));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    // A subscriber may already be installed (tests); keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(path)
}

/// Run the entry check, or `None` when it is disabled.
pub fn check_venue<P: LocationProvider>(
    provider: &P,
    venue: Option<&VenueRegion>,
    settings: &config::Settings,
) -> Option<GateDecision> {
    if !settings.venue.gate {
        tracing::info!("venue gate disabled");
        return None;
    }
    let options = PositionOptions {
        timeout: Duration::from_millis(settings.venue.gate_timeout_ms),
        ..settings.location.position_options()
    };
    Some(check_entry(provider, venue, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_event_path_and_flags() {
        let a = args(&["--dump-config", "walk.json"]).unwrap();
        assert!(a.dump_config);
        assert_eq!(a.event_path, Some(PathBuf::from("walk.json")));
        assert_eq!(args(&[]).unwrap(), CliArgs::default());
    }

    #[test]
    fn rejects_unknown_flags_and_extra_paths() {
        assert!(args(&["--shuffle"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn event_path_precedence() {
        let mut settings = config::Settings::default();
        let none = CliArgs::default();
        assert_eq!(event_path(&none, &settings), PathBuf::from(DEFAULT_EVENT_FILE));

        settings.event.path = Some(PathBuf::from("/srv/e.json"));
        assert_eq!(event_path(&none, &settings), PathBuf::from("/srv/e.json"));

        let cli = args(&["here.json"]).unwrap();
        assert_eq!(event_path(&cli, &settings), PathBuf::from("here.json"));
    }

    #[test]
    fn disabled_gate_is_skipped() {
        let mut settings = config::Settings::default();
        settings.venue.gate = false;
        let provider = crate::location::DeviceProvider::Unsupported;
        assert_eq!(check_venue(&provider, None, &settings), None);
    }
}
