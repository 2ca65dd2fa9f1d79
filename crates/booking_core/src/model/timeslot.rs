//! Bookable time-slot schedule.
//!
//! # Responsibility
//! - Hold the date -> start-times map offered to customers.
//! - Generate regular slots over a date and time-of-day range.
//!
//! # Invariants
//! - Dates and times are unique and kept sorted.
//! - A date with no times is removed rather than stored empty.

use chrono::{Days, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_SLOT_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSlotError {
    /// The generation range is empty or inverted.
    InvalidRange(String),
}

impl Display for TimeSlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange(message) => write!(f, "invalid slot range: {message}"),
        }
    }
}

impl Error for TimeSlotError {}

/// Start times offered per day.
///
/// Serialized as a JSON object keyed by `YYYY-MM-DD` with sorted
/// `HH:MM:SS` arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlotSchedule {
    days: BTreeMap<NaiveDate, BTreeSet<NaiveTime>>,
}

impl TimeSlotSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of slots across all days.
    pub fn slot_count(&self) -> usize {
        self.days.values().map(BTreeSet::len).sum()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.keys().copied().collect()
    }

    pub fn slots_on(&self, date: NaiveDate) -> Vec<NaiveTime> {
        self.days
            .get(&date)
            .map(|times| times.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Adds one slot; returns `false` when it already existed.
    pub fn insert(&mut self, date: NaiveDate, time: NaiveTime) -> bool {
        self.days.entry(date).or_default().insert(time)
    }

    /// Replaces the times of `date`; an empty list clears the day.
    pub fn set_day(&mut self, date: NaiveDate, times: impl IntoIterator<Item = NaiveTime>) {
        let times: BTreeSet<NaiveTime> = times.into_iter().collect();
        if times.is_empty() {
            self.days.remove(&date);
        } else {
            self.days.insert(date, times);
        }
    }

    /// Removes `date`; returns how many slots it held.
    pub fn clear_day(&mut self, date: NaiveDate) -> usize {
        self.days.remove(&date).map_or(0, |times| times.len())
    }

    /// Adds every slot of `other`; returns how many were new.
    pub fn merge(&mut self, other: &TimeSlotSchedule) -> usize {
        other
            .days
            .iter()
            .flat_map(|(date, times)| times.iter().map(move |time| (*date, *time)))
            .filter(|(date, time)| self.insert(*date, *time))
            .count()
    }

    /// Dates from `from` through `from + days` that still offer a slot.
    pub fn available_dates(&self, from: NaiveDate, days: u64) -> Vec<NaiveDate> {
        let until = from.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        self.days.range(from..=until).map(|(date, _)| *date).collect()
    }

    /// Drops every day strictly before `today`; returns the removed slot count.
    pub fn prune_before(&mut self, today: NaiveDate) -> usize {
        let kept = self.days.split_off(&today);
        let removed = std::mem::replace(&mut self.days, kept);
        removed.values().map(BTreeSet::len).sum()
    }
}

/// Regular slots between two dates and two times of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// First slot of each day.
    pub start_time: NaiveTime,
    /// Slots start strictly before this time.
    pub end_time: NaiveTime,
    pub step_minutes: u32,
}

impl SlotRange {
    /// Hourly slots, inclusive of both dates.
    pub fn hourly(
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            start_date,
            end_date,
            start_time,
            end_time,
            step_minutes: DEFAULT_SLOT_MINUTES,
        }
    }

    pub fn with_step_minutes(mut self, step_minutes: u32) -> Self {
        self.step_minutes = step_minutes;
        self
    }

    fn validate(&self) -> Result<(), TimeSlotError> {
        if self.end_date < self.start_date {
            return Err(TimeSlotError::InvalidRange(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if self.end_time <= self.start_time {
            return Err(TimeSlotError::InvalidRange(format!(
                "end time {} is not after start time {}",
                self.end_time, self.start_time
            )));
        }
        if self.step_minutes == 0 {
            return Err(TimeSlotError::InvalidRange(
                "slot length must be at least one minute".to_string(),
            ));
        }
        Ok(())
    }

    fn times_of_day(&self) -> Vec<NaiveTime> {
        let step = Duration::minutes(i64::from(self.step_minutes));
        let mut times = Vec::new();
        let mut current = self.start_time;
        while current < self.end_time {
            times.push(current);
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            current = next;
        }
        times
    }

    /// Builds the schedule covering this range.
    pub fn generate(&self) -> Result<TimeSlotSchedule, TimeSlotError> {
        self.validate()?;
        let times = self.times_of_day();
        let mut schedule = TimeSlotSchedule::new();
        for date in self.start_date.iter_days().take_while(|date| *date <= self.end_date) {
            schedule.set_day(date, times.iter().copied());
        }
        Ok(schedule)
    }
}
