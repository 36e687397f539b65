//! The backing file: a CSV table of events.
//!
//! Row 1 is the header `Title,Start Time,End Time`; each following row holds
//! one event. Reads are lenient about individual rows (blank or malformed rows
//! are skipped) and strict about the file as a whole (I/O, encoding and size
//! failures are returned as `StorageError`).

use crate::calendar::Event;
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Name of the events table inside the backing file.
pub const EVENTS_TABLE: &str = "Events";
pub const HEADER: [&str; 3] = ["Title", "Start Time", "End Time"];

// Timestamps are written with seconds and read with or without them
const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const STORED_FORMAT_SHORT: &str = "%Y-%m-%d %H:%M";
// Maximum allowed size for the backing file (10MB)
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROWS: usize = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on backing file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Backing file is {size} bytes, above the 10MB limit")]
    TooLarge { size: u64 },
    #[error("Backing file holds more than 10000 rows")]
    TooManyRows,
}

/// Identity of the file contents as last seen on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct EventRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title().to_string(),
            start_time: event.start_time().format(STORED_FORMAT).to_string(),
            end_time: event.end_time().format(STORED_FORMAT).to_string(),
        }
    }
}

impl EventRow {
    fn into_event(self) -> Option<Event> {
        let start = parse_stored_timestamp(&self.start_time)?;
        let end = parse_stored_timestamp(&self.end_time)?;
        Event::new(self.title, start, end).ok()
    }
}

fn parse_stored_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, STORED_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, STORED_FORMAT_SHORT))
        .ok()
}

#[derive(Debug, Clone)]
pub struct EventSheet {
    path: PathBuf,
}

impl EventSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Current stamp of the file, or `None` when it cannot be read.
    pub fn stamp(&self) -> Option<FileStamp> {
        let metadata = fs::metadata(&self.path).ok()?;
        Some(FileStamp { modified: metadata.modified().ok(), len: metadata.len() })
    }

    /// Read every valid event row after the header.
    ///
    /// The returned events are in file order.
    pub fn read_events(&self) -> Result<Vec<Event>, StorageError> {
        // Check file size before loading
        let metadata = fs::metadata(&self.path)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(StorageError::TooLarge { size: metadata.len() });
        }

        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut events = Vec::new();
        let mut rows = 0usize;
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            // Header is row 1, data starts at row 2
            let row_number = index + 2;

            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows += 1;
            if rows > MAX_ROWS {
                return Err(StorageError::TooManyRows);
            }
            if record.len() != HEADER.len() {
                debug!("Skipping row {}: expected {} cells, found {}", row_number, HEADER.len(), record.len());
                continue;
            }

            match record.deserialize::<EventRow>(None).ok().and_then(EventRow::into_event) {
                Some(event) => events.push(event),
                None => debug!("Skipping row {}: not a valid event {:?}", row_number, record),
            }
        }

        debug!("Read {} events from table '{}' in {}", events.len(), EVENTS_TABLE, self.path.display());
        Ok(events)
    }

    /// Overwrite the whole file with the header and `events`.
    pub fn write_events(&self, events: &[Event]) -> Result<(), StorageError> {
        self.ensure_parent_dir()?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(&self.path)?;
        writer.write_record(HEADER)?;
        for event in events {
            writer.serialize(EventRow::from(event))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append one event row to the end of an existing file.
    pub fn append_event(&self, event: &Event) -> Result<(), StorageError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.serialize(EventRow::from(event))?;
        writer.flush()?;
        Ok(())
    }

    fn ensure_parent_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn event(title: &str, start: &str, end: &str) -> Event {
        Event::new(title, at(start), at(end)).unwrap()
    }

    #[test]
    fn test_write_then_read() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let sheet = EventSheet::new(dir.path().join("calendar.csv"));
        let events = vec![
            event("Standup", "2024-01-10 09:00", "2024-01-10 09:30"),
            event("Lunch, with team", "2024-01-10 12:00", "2024-01-10 13:00"),
        ];

        sheet.write_events(&events)?;
        assert_eq!(sheet.read_events()?, events);

        let content = fs::read_to_string(sheet.path())?;
        assert!(content.starts_with("Title,Start Time,End Time\n"));
        assert!(content.contains("Standup,2024-01-10 09:00:00,2024-01-10 09:30:00"));
        Ok(())
    }

    #[test]
    fn test_header_only_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let sheet = EventSheet::new(dir.path().join("calendar.csv"));
        sheet.write_events(&[])?;

        assert_eq!(fs::read_to_string(sheet.path())?, "Title,Start Time,End Time\n");
        assert!(sheet.read_events()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_append_event() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let sheet = EventSheet::new(dir.path().join("calendar.csv"));
        sheet.write_events(&[event("Standup", "2024-01-10 09:00", "2024-01-10 09:30")])?;
        sheet.append_event(&event("Lunch", "2024-01-10 12:00", "2024-01-10 13:00"))?;

        let titles: Vec<_> = sheet.read_events()?.iter().map(|e| e.title().to_string()).collect();
        assert_eq!(titles, vec!["Standup", "Lunch"]);
        Ok(())
    }

    #[test]
    fn test_append_requires_existing_file() {
        let dir = tempdir().unwrap();
        let sheet = EventSheet::new(dir.path().join("missing.csv"));
        let result = sheet.append_event(&event("Standup", "2024-01-10 09:00", "2024-01-10 09:30"));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn test_skips_blank_and_malformed_rows() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("calendar.csv");
        fs::write(
            &path,
            "Title,Start Time,End Time\n\
             Standup,2024-01-10 09:00:00,2024-01-10 09:30:00\n\
             ,,\n\
             Broken,not a date,2024-01-10 10:00:00\n\
             Backwards,2024-01-10 11:00,2024-01-10 10:00\n\
             ,2024-01-10 14:00,2024-01-10 15:00\n\
             Too,many,cells,here\n\
             Short,2024-01-10 16:00\n\
             Lunch,2024-01-10 12:00,2024-01-10 13:00\n",
        )?;

        let events = EventSheet::new(&path).read_events()?;
        assert_eq!(
            events,
            vec![
                event("Standup", "2024-01-10 09:00", "2024-01-10 09:30"),
                event("Lunch", "2024-01-10 12:00", "2024-01-10 13:00"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_an_error() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("calendar.csv");
        fs::write(&path, b"Title,Start Time,End Time\n\xff\xfe,\x00\x81,\xc3\x28\n")?;

        assert!(matches!(EventSheet::new(&path).read_events(), Err(StorageError::Csv(_))));
        Ok(())
    }

    #[test]
    fn test_oversized_file_is_rejected() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("calendar.csv");
        let file = File::create(&path)?;
        file.set_len(MAX_FILE_SIZE + 1)?;

        assert!(matches!(EventSheet::new(&path).read_events(), Err(StorageError::TooLarge { .. })));
        Ok(())
    }

    #[test]
    fn test_stamp_changes_after_write() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let sheet = EventSheet::new(dir.path().join("calendar.csv"));
        assert!(sheet.stamp().is_none());

        sheet.write_events(&[])?;
        let before = sheet.stamp();
        sheet.append_event(&event("Standup", "2024-01-10 09:00", "2024-01-10 09:30"))?;
        assert_ne!(sheet.stamp(), before);
        Ok(())
    }
}
