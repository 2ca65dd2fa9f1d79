//! Booking use-case service.
//!
//! # Responsibility
//! - Provide the caller-facing add/get/list/update/delete entry points.
//! - Trigger the new-booking notification after a persisted create.
//! - Expose phone lookup, statistics and past-booking cleanup.
//!
//! # Invariants
//! - The notifier runs only after the create has been persisted.
//! - Notifier errors are logged and reported, never returned as errors.
//! - Service APIs never bypass repository persistence.

use crate::logging::sanitize_message;
use crate::model::booking::{Booking, BookingFields};
use crate::notify::{BookingNotifier, NotificationStatus};
use crate::repo::booking_repo::{BookingListQuery, BookingRepository, RepoResult};
use crate::search::phone::{PhoneQuery, SearchResult};
use crate::service::cleanup::{compute_stats, BookingStats, PurgeRequest};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

const MAX_NOTIFY_ERROR_CHARS: usize = 200;

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddedBooking {
    pub booking: Booking,
    pub notification: NotificationStatus,
}

impl AddedBooking {
    pub fn id(&self) -> &str {
        &self.booking.id
    }
}

/// Use-case service wiring a repository to a notifier.
pub struct BookingService<R: BookingRepository, N: BookingNotifier> {
    repo: R,
    notifier: N,
}

impl<R: BookingRepository, N: BookingNotifier> BookingService<R, N> {
    pub fn new(repo: R, notifier: N) -> Self {
        Self { repo, notifier }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates and persists a booking, then notifies best-effort.
    ///
    /// # Contract
    /// - `Err` means nothing was stored and no notification was attempted.
    /// - `Ok` carries the stored record and the notification outcome.
    pub fn add_booking(&mut self, fields: BookingFields) -> RepoResult<AddedBooking> {
        let booking = self.repo.create_booking(fields)?;
        let notification = self.notify_created(&booking);
        Ok(AddedBooking {
            booking,
            notification,
        })
    }

    pub fn get_booking(&self, id: &str) -> Option<Booking> {
        self.repo.get_booking(id)
    }

    /// Lists bookings in insertion order, optionally for one `date`.
    pub fn list_bookings(&self, date: Option<&str>) -> Vec<Booking> {
        let query = BookingListQuery {
            date: date.map(str::to_string),
        };
        self.repo.list_bookings(&query)
    }

    /// Replaces all caller fields of a booking; `id`/`created_at` survive.
    pub fn update_booking(&mut self, id: &str, fields: BookingFields) -> RepoResult<Booking> {
        self.repo.update_booking(id, fields)
    }

    pub fn delete_booking(&mut self, id: &str) -> RepoResult<Booking> {
        self.repo.delete_booking(id)
    }

    /// Finds bookings whose phone matches `phone`, ignoring formatting.
    pub fn find_by_phone(&self, phone: &str) -> SearchResult<Vec<Booking>> {
        let query = PhoneQuery::parse(phone)?;
        Ok(self
            .repo
            .list_bookings(&BookingListQuery::default())
            .into_iter()
            .filter(|booking| query.matches(booking))
            .collect())
    }

    /// Counts bookings by status and how many fall before `today`.
    pub fn stats(&self, today: NaiveDate) -> BookingStats {
        compute_stats(&self.repo.list_bookings(&BookingListQuery::default()), today)
    }

    /// Deletes past bookings selected by `request` in one write.
    pub fn purge_past(&mut self, request: &PurgeRequest) -> RepoResult<Vec<Booking>> {
        let removed = self
            .repo
            .delete_matching(&|booking: &Booking| request.selects(booking))?;
        info!(
            "event=booking_cleanup module=service status=ok cutoff={} removed={}",
            request.cutoff,
            removed.len()
        );
        Ok(removed)
    }

    fn notify_created(&self, booking: &Booking) -> NotificationStatus {
        if !self.notifier.is_enabled() {
            return NotificationStatus::Disabled;
        }
        match self.notifier.booking_created(booking) {
            Ok(()) => NotificationStatus::Sent,
            Err(err) => {
                let reason = sanitize_message(&err.to_string(), MAX_NOTIFY_ERROR_CHARS);
                warn!(
                    "event=notify_send module=service status=error id={} error_code=notify_failed error={}",
                    booking.id, reason
                );
                NotificationStatus::Failed(reason)
            }
        }
    }
}
