//! Terminal presentation shell.
//!
//! Collects input, calls the store and renders numbered lists. It holds one
//! long-lived `CalendarStore` and refreshes it from disk before every command.

use crate::calendar::{parse_date, CalendarStore, Event, Slot};
use crate::cli::{Commands, ShellLine};
use crate::config::Config;
use anyhow::Result;
use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;

pub struct Application {
    store: CalendarStore,
    config: Config,
}

impl Application {
    pub fn new(store: CalendarStore, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &CalendarStore {
        &self.store
    }

    pub fn run(&mut self) -> Result<()> {
        log::info!("Starting Daybook Terminal with {}", self.store.path().display());

        let mut rl = DefaultEditor::new()?;
        println!("Welcome to Daybook! Type 'help' for commands.");

        let mut stdout = std::io::stdout();
        loop {
            match rl.readline("daybook> ") {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    match self.process_input(&line, &mut stdout) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(err) => log::error!("Failed to process command: {:?}", err),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one line of terminal input. Returns `false` when the user asked
    /// to leave.
    pub fn process_input(&mut self, input: &str, out: &mut impl Write) -> Result<bool> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(true);
        }
        if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit") {
            log::debug!("Exit command received");
            return Ok(false);
        }

        let tokens = match shell_words::split(trimmed) {
            Ok(tokens) => tokens,
            Err(e) => {
                writeln!(out, "Could not read command: {}", e)?;
                return Ok(true);
            }
        };
        log::debug!("Tokenized input: {:?}", tokens);

        match ShellLine::try_parse_from(tokens) {
            Ok(line) => self.execute(line.command, out)?,
            // Covers `help` as well as usage errors
            Err(e) => write!(out, "{}", e.render())?,
        }
        Ok(true)
    }

    pub fn execute(&mut self, command: Commands, out: &mut impl Write) -> Result<()> {
        self.store.refresh();
        log::debug!("Executing {:?}", command);

        match command {
            Commands::Create { title, date, start_time, end_time } => {
                let outcome = self.store.create_event(
                    &title,
                    &format!("{} {}", date, start_time),
                    &format!("{} {}", date, end_time),
                );
                writeln!(out, "{}", outcome.message)?;
            }
            Commands::Today => {
                let today = self.store.today();
                writeln!(out, "{}", render_events(self.store.events_on(today), "No events today."))?;
            }
            Commands::Remaining => {
                let remaining = self.store.list_remaining_events_for_today();
                writeln!(out, "{}", render_events(remaining, "No remaining events."))?;
            }
            Commands::List { date } => {
                let date = date.unwrap_or_else(|| self.store.today().format("%Y-%m-%d").to_string());
                let events = self.store.list_events_for_day(&date);
                writeln!(out, "{}", render_events(events, "No events on selected date."))?;
            }
            Commands::All => {
                writeln!(out, "{}", render_events(self.store.events(), "No events to delete."))?;
            }
            Commands::Delete { position } => {
                writeln!(out, "{}", self.store.delete_event(&position).message)?;
            }
            Commands::Slots { date, minutes } => {
                let minutes = minutes.unwrap_or(self.config.slots.default_duration_minutes);
                let date = match date {
                    Some(text) => match parse_date(&text) {
                        Ok(date) => date,
                        Err(_) => {
                            writeln!(out, "Invalid date format. Use YYYY-MM-DD.")?;
                            return Ok(());
                        }
                    },
                    None => self.store.today(),
                };
                let slots = self.store.find_all_available_slots(minutes, date);
                writeln!(out, "{}", render_slots(&slots, self.config.slots.max_shown))?;
            }
        }
        Ok(())
    }
}

/// Numbered list `1..n`, or `empty` when there is nothing to show.
pub fn render_events<'a>(events: impl IntoIterator<Item = &'a Event>, empty: &str) -> String {
    let lines: Vec<String> =
        events.into_iter().enumerate().map(|(i, e)| format!("{}. {}", i + 1, e)).collect();
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

/// The first `max_shown` slots with their lengths.
pub fn render_slots(slots: &[Slot], max_shown: usize) -> String {
    if slots.is_empty() {
        return "No available slots found.".to_string();
    }
    let shown = slots.len().min(max_shown);
    let mut output = format!("{} slots found. Showing top {}:", slots.len(), shown);
    for slot in &slots[..shown] {
        output.push_str(&format!(
            "\n→ {} - {} (Duration: {} mins)",
            slot.start.format("%H:%M"),
            slot.end.format("%H:%M"),
            slot.duration_minutes()
        ));
    }
    output
}
