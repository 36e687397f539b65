use super::{
    end_of_day, find_slots, parse_date, parse_datetime, parse_position, start_of_day,
    CalendarError, Event, Outcome, Slot,
};
use crate::clock::{Clock, SystemClock};
use crate::storage::{EventSheet, FileStamp, EVENTS_TABLE};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// The calendar: a time-ordered list of non-overlapping events mirrored to a
/// backing file.
///
/// Every mutation rewrites or appends to the file before returning. A failed
/// write is logged and the in-memory change is kept; the store is then dirty
/// and the next write rewrites the whole table, bringing the file back in line.
/// While dirty, memory is authoritative and `refresh` leaves it alone.
#[derive(Debug)]
pub struct CalendarStore {
    events: Vec<Event>,
    sheet: EventSheet,
    clock: Box<dyn Clock>,
    stamp: Option<FileStamp>,
    dirty: bool,
}

impl CalendarStore {
    /// Open the calendar stored at `path`, creating it if missing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, SystemClock)
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: impl Clock + 'static) -> Self {
        let mut store = Self {
            events: Vec::new(),
            sheet: EventSheet::new(path),
            clock: Box::new(clock),
            stamp: None,
            dirty: false,
        };
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        self.sheet.path()
    }

    /// All events, ascending by start time.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    /// Re-read the backing file unconditionally.
    pub fn reload(&mut self) {
        self.load();
    }

    /// Whether the last write failed and memory holds changes the file lacks.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Re-read the backing file if it changed since this store last read or
    /// wrote it. Returns whether a reload happened.
    ///
    /// A dirty store never reloads: its unsaved events would be lost.
    pub fn refresh(&mut self) -> bool {
        if self.dirty {
            debug!("Skipping refresh of {}: unsaved changes pending", self.path().display());
            return false;
        }
        let current = self.sheet.stamp();
        if current == self.stamp {
            return false;
        }
        debug!("Backing file {} changed on disk, reloading", self.path().display());
        self.load();
        true
    }

    fn load(&mut self) {
        self.events.clear();
        self.dirty = false;

        if !self.sheet.exists() {
            info!("No calendar at {}, creating an empty '{}' table", self.path().display(), EVENTS_TABLE);
            self.persist_all();
        } else {
            match self.sheet.read_events() {
                Ok(mut events) => {
                    events.sort_by_key(Event::start_time);
                    info!("Loaded {} events from {}", events.len(), self.path().display());
                    self.events = events;
                }
                Err(e) => {
                    warn!("Could not load calendar from {}: {}; starting empty", self.path().display(), e);
                    self.persist_all();
                }
            }
        }
        // Taken even when the reset write failed
        self.stamp = self.sheet.stamp();
    }

    /// Rewrite the whole backing file from memory.
    pub fn save(&mut self) -> Result<(), CalendarError> {
        if let Err(e) = self.sheet.write_events(&self.events) {
            self.dirty = true;
            return Err(e.into());
        }
        self.dirty = false;
        self.stamp = self.sheet.stamp();
        Ok(())
    }

    fn persist_all(&mut self) {
        if let Err(e) = self.save() {
            warn!("Failed to save calendar to {}: {}", self.path().display(), e);
        }
    }

    /// Append `event` when the file is exactly as this store last left it;
    /// otherwise rewrite the whole table.
    fn persist_appended(&mut self, event: &Event) {
        if self.dirty || !self.sheet.exists() || self.sheet.stamp() != self.stamp {
            self.persist_all();
            return;
        }
        match self.sheet.append_event(event) {
            Ok(()) => self.stamp = self.sheet.stamp(),
            Err(e) => {
                self.dirty = true;
                warn!("Failed to save event '{}' to {}: {}", event.title(), self.path().display(), e);
            }
        }
    }

    /// Validate and insert a new event.
    ///
    /// The file is re-read first if another writer changed it, so the overlap
    /// check sees every stored event.
    ///
    /// Checks run in order: non-blank title, both timestamps parse as
    /// `YYYY-MM-DD HH:MM`, start before end, no overlap with any stored event.
    pub fn try_create_event(
        &mut self,
        title: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Event, CalendarError> {
        self.refresh();
        if title.trim().is_empty() {
            return Err(CalendarError::MissingTitle);
        }
        let start = parse_datetime(start_time)?;
        let end = parse_datetime(end_time)?;
        let event = Event::new(title, start, end)?;

        if let Some(existing) = self.events.iter().find(|e| e.overlaps(start, end)) {
            debug!("Rejected '{}': overlaps with '{}'", title, existing.title());
            return Err(CalendarError::Overlap { title: existing.title().to_string() });
        }

        let index = self.events.partition_point(|e| e.start_time() <= start);
        self.events.insert(index, event.clone());
        info!("Created event: {}", event);
        self.persist_appended(&event);
        Ok(event)
    }

    pub fn create_event(&mut self, title: &str, start_time: &str, end_time: &str) -> Outcome {
        match self.try_create_event(title, start_time, end_time) {
            Ok(_) => Outcome::ok("Event created."),
            Err(e) => e.into(),
        }
    }

    /// Remove the event at a 1-based position typed by a user.
    pub fn try_delete_event(&mut self, position: &str) -> Result<Event, CalendarError> {
        let number = parse_position(position)?;
        self.delete_at(number)
    }

    /// Remove the event at a 1-based position in the current sorted list.
    ///
    /// The file is re-read first if another writer changed it. Positions
    /// shift after a removal; compute them again from `events()` before
    /// deleting another one.
    pub fn delete_at(&mut self, position: i64) -> Result<Event, CalendarError> {
        self.refresh();
        let index = usize::try_from(position)
            .ok()
            .and_then(|p| p.checked_sub(1))
            .filter(|&i| i < self.events.len())
            .ok_or_else(|| CalendarError::Range { position: position.to_string() })?;

        let removed = self.events.remove(index);
        info!("Deleted event at position {}: {}", position, removed);
        self.persist_all();
        Ok(removed)
    }

    pub fn delete_event(&mut self, position: &str) -> Outcome {
        match self.try_delete_event(position) {
            Ok(_) => Outcome::ok("Event deleted."),
            Err(e) => e.into(),
        }
    }

    /// Events starting on `date`, ascending by start time.
    pub fn events_on(&self, date: NaiveDate) -> &[Event] {
        let from = self.events.partition_point(|e| e.date() < date);
        let to = self.events.partition_point(|e| e.date() <= date);
        &self.events[from..to]
    }

    /// Events starting on a `YYYY-MM-DD` day; empty if the text does not parse.
    pub fn list_events_for_day(&self, date: &str) -> &[Event] {
        match parse_date(date) {
            Ok(date) => self.events_on(date),
            Err(_) => {
                debug!("Ignoring unparseable date '{}'", date);
                &[]
            }
        }
    }

    /// Today's events that have not ended yet.
    pub fn list_remaining_events_for_today(&self) -> Vec<&Event> {
        let now = self.clock.now();
        self.events_on(now.date()).iter().filter(|e| e.end_time() > now).collect()
    }

    /// Every free slot of `duration_minutes` on `target_date`, one minute apart.
    ///
    /// For today the search starts at the current instant, otherwise at
    /// midnight; it always ends at 23:59:59.
    pub fn find_all_available_slots(&self, duration_minutes: i64, target_date: NaiveDate) -> Vec<Slot> {
        let now = self.clock.now();
        let window_start = if target_date == now.date() { now } else { start_of_day(target_date) };
        find_slots(self.events_on(target_date), duration_minutes, window_start, end_of_day(target_date))
    }
}
