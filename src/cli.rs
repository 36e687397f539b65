use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Daybook - a personal calendar kept in a CSV file
#[derive(Debug, Parser)]
#[command(name = "daybook")]
#[command(about = "A personal calendar kept in a CSV file", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute (if not specified, enters interactive terminal mode)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backing CSV file (overrides the configured one)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// One line typed into the interactive terminal.
#[derive(Debug, Parser)]
#[command(name = "daybook", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Create a new event
    #[command(alias = "add")]
    Create {
        /// Event title
        title: String,

        /// Event date (YYYY-MM-DD)
        date: String,

        /// Start time (HH:MM)
        start_time: String,

        /// End time (HH:MM)
        end_time: String,
    },

    /// List today's events
    Today,

    /// List today's events that have not ended yet
    Remaining,

    /// List events on a date (YYYY-MM-DD, defaults to today)
    List { date: Option<String> },

    /// List every event with the position used by `delete`
    All,

    /// Delete the event at a position shown by `all`
    #[command(alias = "rm")]
    Delete {
        #[arg(allow_hyphen_values = true)]
        position: String,
    },

    /// Find free slots of a given length
    Slots {
        /// Date to search (YYYY-MM-DD, defaults to today)
        date: Option<String>,

        /// Slot length in minutes (defaults to the configured duration)
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=1440))]
        minutes: Option<i64>,
    },
}
