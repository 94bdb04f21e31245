//! Pomotrack - a Pomodoro timer with task tracking and statistics.
//!
//! The timer runs in the terminal: commands are read from stdin, the
//! status line is redrawn on every change, and sessions, tasks and
//! statistics are kept in a local SQLite database.

use std::io;
use std::sync::mpsc;

use clap::Parser;
use tracing::{error, info};

mod app;
mod audio;
mod config;
mod driver;
mod effects;
mod event;
mod models;
mod notifications;
mod persistence;
mod profiles;
mod recorder;
mod scheduler;
mod stats;
mod status;
mod timer;

use app::{App, AppError};
use config::{Cli, Config};
use driver::Driver;
use effects::{DesktopAlerts, EffectRunner};
use persistence::Store;
use recorder::Recorder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_cli(Cli::parse())?;

    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter()?)
        .with_writer(io::stderr)
        .init();

    run(config)?;
    Ok(())
}

fn run(config: Config) -> Result<(), AppError> {
    let store = Store::open(&config.db_path)?;
    let mut settings = store.settings();
    if let Some(profile) = config.override_profile(&settings.custom_profiles)? {
        settings = store.update_settings(|s| s.active_profile_id = profile.id)?;
    }
    info!(
        db = %config.db_path.display(),
        profile = %settings.active_profile_id,
        "starting pomotrack"
    );

    let store = store.into_shared();
    let (recorder, worker) = Recorder::spawn(store.clone());

    let mut app = App::new(settings, config.auto_start_delay);
    println!("{}", event::HELP);
    println!("{}", status::format_status(&app.snapshot()));
    let renderer = driver::spawn_renderer(app.subscribe());

    let (tx, rx) = mpsc::channel();
    // Blocks on stdin; left running when the driver quits.
    driver::spawn_input(tx);

    let runner = EffectRunner::new(recorder, DesktopAlerts::new());
    let mut driver = Driver::new(app, store, runner, io::stdout());
    driver.run(rx)?;

    // Dropping the driver closes the recorder queue and the snapshot feed.
    drop(driver);
    if worker.join().is_err() {
        error!("recorder thread panicked");
    }
    if renderer.join().is_err() {
        error!("status renderer panicked");
    }
    println!();
    Ok(())
}
