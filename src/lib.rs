pub mod app;
pub mod calendar;
pub mod cli;
pub mod clock;
pub mod config;
pub mod storage;

use anyhow::{Context, Result};
use log::*;

/// Run the command given on the command line, or the interactive terminal
/// when there is none.
pub fn run(cli: cli::Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_file = match cli.file {
        Some(path) => path,
        None => config.data_file().context("Failed to resolve the calendar file")?,
    };
    info!("Using calendar file {}", data_file.display());

    let store = CalendarStore::open(data_file);
    let mut app = app::Application::new(store, config);
    match cli.command {
        Some(command) => app.execute(command, &mut std::io::stdout()),
        None => app.run(),
    }
}

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use calendar::{CalendarError, CalendarStore, Event, Outcome, Slot};
pub use config::Config;
