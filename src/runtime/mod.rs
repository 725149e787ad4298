use std::env;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::config;
use crate::event::EventData;
use crate::location::{DeviceProvider, LocationSource};

mod event_loop;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = startup::parse_args(env::args().skip(1))?;
    if args.help {
        println!("{}", startup::USAGE);
        return Ok(());
    }

    let (settings, settings_problem) = config::Settings::load_or_default();
    if let Some(reason) = &settings_problem {
        eprintln!("earshot: {reason}; running with default settings");
    }
    if args.dump_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let log_path = startup::init_logging(&settings.log)?;
    tracing::info!(log = %log_path.display(), "earshot starting");
    if let Some(reason) = settings_problem {
        tracing::warn!(%reason, "config ignored, using defaults");
    }

    let event_path = startup::event_path(&args, &settings);
    let event = EventData::load(&event_path)?;
    let load_issues = event.issues.len();
    let venue = event.venue;

    let sources = event.markers.iter().map(|m| m.audio.clone()).collect();
    let audio_player = AudioPlayer::new(sources);
    let mut app = App::new(event.info, event.markers, settings.proximity.threshold_m);
    app.load_issues = load_issues;
    app.venue_center = venue.as_ref().and_then(|v| v.center());
    app.set_playback_handle(audio_player.playback_handle());

    let provider = DeviceProvider::from_settings(&settings.location);
    if let Some(decision) = startup::check_venue(&provider, venue.as_ref(), &settings) {
        app.set_gate(decision);
    }

    let mock = settings.location.mock_location()?;
    let source = LocationSource::new(
        provider,
        settings.location.position_options(),
        settings.location.initial_mode(),
        mock,
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut session = event_loop::Session {
            settings: &settings,
            source,
            audio_player: &audio_player,
            venue: venue.as_ref(),
        };

        event_loop::run(&mut terminal, &mut app, &mut session)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("earshot stopped");
    run_result
}
