//! Past-booking statistics and cleanup rules.
//!
//! # Invariants
//! - Bookings without a parseable `YYYY-MM-DD` date are never purged and
//!   never counted as past.
//! - Hour-based purges also need a parseable `time`; without one the
//!   booking is kept.
//! - A booking without a `status` field counts as pending.

use crate::model::booking::{Booking, BookingStatus};
use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BookingStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    /// Bookings whose status text is not a known status.
    pub other: usize,
    /// Bookings dated strictly before the reference day.
    pub past: usize,
}

/// Point in time a booking must lie before to be purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeCutoff {
    /// Bookings dated strictly before this day.
    Day(NaiveDate),
    /// Bookings whose `date` + `time` start at or before this moment.
    Moment(NaiveDateTime),
}

impl PurgeCutoff {
    fn selects(&self, booking: &Booking) -> bool {
        match self {
            Self::Day(cutoff) => booking.appointment_date().is_some_and(|date| date < *cutoff),
            Self::Moment(cutoff) => booking
                .appointment_start()
                .is_some_and(|start| start <= *cutoff),
        }
    }
}

impl Display for PurgeCutoff {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{date}"),
            Self::Moment(moment) => write!(f, "{}", moment.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Selection of bookings to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeRequest {
    pub cutoff: PurgeCutoff,
    /// Restricts the purge to these statuses; `None` purges any status.
    pub statuses: Option<Vec<BookingStatus>>,
}

impl PurgeRequest {
    pub fn before(cutoff: NaiveDate) -> Self {
        Self {
            cutoff: PurgeCutoff::Day(cutoff),
            statuses: None,
        }
    }

    /// Bookings that started at least `hours_old` hours before `now`.
    pub fn completed(now: NaiveDateTime, hours_old: u64) -> Self {
        let hours = i64::try_from(hours_old).unwrap_or(i64::MAX);
        let cutoff = Duration::try_hours(hours)
            .and_then(|age| now.checked_sub_signed(age))
            .unwrap_or(NaiveDateTime::MIN);
        Self {
            cutoff: PurgeCutoff::Moment(cutoff),
            statuses: None,
        }
    }

    /// Bookings at least `days_old` days before `today`.
    pub fn older_than(today: NaiveDate, days_old: u64) -> Self {
        let cutoff = today
            .checked_add_days(Days::new(1))
            .and_then(|tomorrow| tomorrow.checked_sub_days(Days::new(days_old)))
            .unwrap_or(NaiveDate::MIN);
        Self::before(cutoff)
    }

    pub fn with_statuses(mut self, statuses: Vec<BookingStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    pub fn selects(&self, booking: &Booking) -> bool {
        if !self.cutoff.selects(booking) {
            return false;
        }
        match &self.statuses {
            Some(statuses) => booking
                .status()
                .is_some_and(|status| statuses.contains(&status)),
            None => true,
        }
    }
}

pub fn compute_stats(bookings: &[Booking], today: NaiveDate) -> BookingStats {
    bookings
        .iter()
        .fold(BookingStats::default(), |mut stats, booking| {
            stats.total += 1;
            match booking.status() {
                Some(BookingStatus::Pending) => stats.pending += 1,
                Some(BookingStatus::Confirmed) => stats.confirmed += 1,
                Some(BookingStatus::Cancelled) => stats.cancelled += 1,
                None => stats.other += 1,
            }
            if booking.appointment_date().is_some_and(|date| date < today) {
                stats.past += 1;
            }
            stats
        })
}
