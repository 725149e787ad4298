mod app;
mod audio;
mod config;
mod event;
mod geo;
mod location;
mod playback;
mod proximity;
mod runtime;
mod ui;
mod venue;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
