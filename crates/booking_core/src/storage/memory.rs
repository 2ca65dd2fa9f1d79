//! In-process storage backend.
//!
//! Clones share one underlying collection, so a caller can keep a handle
//! after moving the storage into a repository and inspect or sabotage writes.

use super::{BookingStorage, StorageError, StorageResult, TimeSlotStorage};
use crate::model::booking::Booking;
use crate::model::timeslot::TimeSlotSchedule;
use std::cell::RefCell;
use std::io::{Error as IoError, ErrorKind};
use std::path::PathBuf;
use std::rc::Rc;

const MEMORY_LOCATION: &str = "<memory>";

#[derive(Debug, Default)]
struct MemoryState {
    bookings: Vec<Booking>,
    schedule: TimeSlotSchedule,
    fail_writes: bool,
    saves: usize,
}

/// Booking and slot storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing collection, as if it had been loaded from disk.
    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        let storage = Self::default();
        storage.state.borrow_mut().bookings = bookings;
        storage
    }

    /// Starts from an existing slot schedule.
    pub fn with_slots(schedule: TimeSlotSchedule) -> Self {
        let storage = Self::default();
        storage.state.borrow_mut().schedule = schedule;
        storage
    }

    /// Makes every subsequent save fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    /// Returns the last successfully saved collection.
    pub fn snapshot(&self) -> Vec<Booking> {
        self.state.borrow().bookings.clone()
    }

    /// Returns the last successfully saved slot schedule.
    pub fn slot_snapshot(&self) -> TimeSlotSchedule {
        self.state.borrow().schedule.clone()
    }

    /// Number of successful saves so far, bookings and slots together.
    pub fn save_count(&self) -> usize {
        self.state.borrow().saves
    }

    fn write(&self, apply: impl FnOnce(&mut MemoryState)) -> StorageResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(StorageError::io(
                PathBuf::from(MEMORY_LOCATION),
                IoError::new(ErrorKind::Other, "writes disabled"),
            ));
        }
        apply(&mut state);
        state.saves += 1;
        Ok(())
    }
}

impl BookingStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Vec<Booking>> {
        Ok(self.snapshot())
    }

    fn save(&self, bookings: &[Booking]) -> StorageResult<()> {
        self.write(|state| state.bookings = bookings.to_vec())
    }
}

impl TimeSlotStorage for MemoryStorage {
    fn load_slots(&self) -> StorageResult<TimeSlotSchedule> {
        Ok(self.slot_snapshot())
    }

    fn save_slots(&self, schedule: &TimeSlotSchedule) -> StorageResult<()> {
        self.write(|state| state.schedule = schedule.clone())
    }
}
