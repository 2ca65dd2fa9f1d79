//! Time-slot repository over the persisted schedule.
//!
//! # Responsibility
//! - Read and edit the date -> times schedule.
//! - Rewrite durable storage after every change.
//!
//! # Invariants
//! - A failed write restores the previous schedule.
//! - Operations that change nothing do not write.

use crate::model::timeslot::{SlotRange, TimeSlotSchedule};
use crate::repo::booking_repo::{RepoError, RepoResult};
use crate::storage::TimeSlotStorage;
use chrono::{NaiveDate, NaiveTime};
use log::{error, info};

/// Repository interface for the bookable-slot schedule.
pub trait TimeSlotRepository {
    fn schedule(&self) -> &TimeSlotSchedule;
    fn slots_on(&self, date: NaiveDate) -> Vec<NaiveTime>;
    /// Dates in `from ..= from + days` that offer at least one slot.
    fn available_dates(&self, from: NaiveDate, days: u64) -> Vec<NaiveDate>;
    /// Replaces one day's times; an empty list clears the day.
    fn set_day(&mut self, date: NaiveDate, times: Vec<NaiveTime>) -> RepoResult<()>;
    /// Returns how many slots were removed.
    fn clear_day(&mut self, date: NaiveDate) -> RepoResult<usize>;
    /// Merges generated slots; returns how many were new.
    fn generate(&mut self, range: &SlotRange) -> RepoResult<usize>;
    /// Removes days before `today`; returns how many slots were removed.
    fn prune_before(&mut self, today: NaiveDate) -> RepoResult<usize>;
}

/// Repository keeping the schedule in memory on top of a storage backend.
pub struct StoredTimeSlotRepository<S: TimeSlotStorage> {
    storage: S,
    schedule: TimeSlotSchedule,
}

impl<S: TimeSlotStorage> StoredTimeSlotRepository<S> {
    pub fn open(storage: S) -> RepoResult<Self> {
        let schedule = storage.load_slots()?;
        info!(
            "event=slots_open module=repo status=ok days={} slots={}",
            schedule.dates().len(),
            schedule.slot_count()
        );
        Ok(Self { storage, schedule })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Applies `change` and persists; restores the old schedule on failure.
    ///
    /// `change` returns the number of affected slots. An unchanged schedule
    /// skips the write.
    fn mutate(
        &mut self,
        operation: &str,
        change: impl FnOnce(&mut TimeSlotSchedule) -> usize,
    ) -> RepoResult<usize> {
        let previous = self.schedule.clone();
        let affected = change(&mut self.schedule);
        if self.schedule == previous {
            return Ok(0);
        }

        if let Err(err) = self.storage.save_slots(&self.schedule) {
            error!(
                "event={operation} module=repo status=error error_code=persist_failed rollback=true error={err}"
            );
            self.schedule = previous;
            return Err(RepoError::Storage(err));
        }

        info!(
            "event={operation} module=repo status=ok affected={affected} slots={}",
            self.schedule.slot_count()
        );
        Ok(affected)
    }
}

impl<S: TimeSlotStorage> TimeSlotRepository for StoredTimeSlotRepository<S> {
    fn schedule(&self) -> &TimeSlotSchedule {
        &self.schedule
    }

    fn slots_on(&self, date: NaiveDate) -> Vec<NaiveTime> {
        self.schedule.slots_on(date)
    }

    fn available_dates(&self, from: NaiveDate, days: u64) -> Vec<NaiveDate> {
        self.schedule.available_dates(from, days)
    }

    fn set_day(&mut self, date: NaiveDate, times: Vec<NaiveTime>) -> RepoResult<()> {
        let count = times.len();
        self.mutate("slots_set_day", |schedule| {
            schedule.set_day(date, times);
            count
        })?;
        Ok(())
    }

    fn clear_day(&mut self, date: NaiveDate) -> RepoResult<usize> {
        self.mutate("slots_clear_day", |schedule| schedule.clear_day(date))
    }

    fn generate(&mut self, range: &SlotRange) -> RepoResult<usize> {
        let generated = range.generate()?;
        self.mutate("slots_generate", |schedule| schedule.merge(&generated))
    }

    fn prune_before(&mut self, today: NaiveDate) -> RepoResult<usize> {
        self.mutate("slots_prune", |schedule| schedule.prune_before(today))
    }
}
