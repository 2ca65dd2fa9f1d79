//! Booking repository contracts and storage-backed implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the in-memory booking list.
//! - Rewrite durable storage after every mutation.
//!
//! # Invariants
//! - Write paths validate input before touching the list.
//! - A failed write rolls the in-memory list back, so memory and storage
//!   never disagree after an error.
//! - `NotFound` means nothing changed; `Storage` means the change was
//!   valid but could not be persisted.

use crate::model::booking::{
    Booking, BookingFields, BookingId, BookingValidationError, FIELD_DATE,
};
use crate::model::timeslot::TimeSlotError;
use crate::storage::{BookingStorage, StorageError};
use log::{error, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for booking and slot persistence and mutation.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookingValidationError),
    Slots(TimeSlotError),
    Storage(StorageError),
    NotFound(BookingId),
}

impl RepoError {
    /// Whether the target booking did not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Slots(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "booking not found: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Slots(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<BookingValidationError> for RepoError {
    fn from(value: BookingValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TimeSlotError> for RepoError {
    fn from(value: TimeSlotError) -> Self {
        Self::Slots(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Query options for listing bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingListQuery {
    /// Exact match on the `date` field.
    pub date: Option<String>,
}

impl BookingListQuery {
    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
        }
    }

    fn matches(&self, booking: &Booking) -> bool {
        match self.date.as_deref() {
            Some(date) => booking.fields.get(FIELD_DATE).and_then(Value::as_str) == Some(date),
            None => true,
        }
    }
}

/// Repository interface for booking CRUD operations.
pub trait BookingRepository {
    fn create_booking(&mut self, fields: BookingFields) -> RepoResult<Booking>;
    fn get_booking(&self, id: &str) -> Option<Booking>;
    fn list_bookings(&self, query: &BookingListQuery) -> Vec<Booking>;
    fn update_booking(&mut self, id: &str, fields: BookingFields) -> RepoResult<Booking>;
    fn delete_booking(&mut self, id: &str) -> RepoResult<Booking>;
    /// Removes every booking matching `predicate` with a single write.
    fn delete_matching(&mut self, predicate: &dyn Fn(&Booking) -> bool)
        -> RepoResult<Vec<Booking>>;
}

/// Repository keeping the full list in memory on top of a storage backend.
pub struct StoredBookingRepository<S: BookingStorage> {
    storage: S,
    bookings: Vec<Booking>,
}

impl<S: BookingStorage> StoredBookingRepository<S> {
    /// Loads the persisted collection and wraps it.
    ///
    /// # Errors
    /// - Returns `RepoError::Storage` when the backend cannot be read or
    ///   refuses corrupt content.
    pub fn open(storage: S) -> RepoResult<Self> {
        let bookings = storage.load()?;
        info!(
            "event=repo_open module=repo status=ok count={}",
            bookings.len()
        );
        Ok(Self { storage, bookings })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.bookings.iter().position(|booking| booking.id == id)
    }

    fn persist(&self, operation: &str, id: &str) -> RepoResult<()> {
        self.storage.save(&self.bookings).map_err(|err| {
            error!(
                "event={operation} module=repo status=error id={id} error_code=persist_failed rollback=true error={err}"
            );
            RepoError::Storage(err)
        })
    }
}

impl<S: BookingStorage> BookingRepository for StoredBookingRepository<S> {
    fn create_booking(&mut self, fields: BookingFields) -> RepoResult<Booking> {
        let booking = Booking::new(fields)?;
        self.bookings.push(booking.clone());

        if let Err(err) = self.persist("booking_create", &booking.id) {
            self.bookings.pop();
            return Err(err);
        }

        info!(
            "event=booking_create module=repo status=ok id={} count={}",
            booking.id,
            self.bookings.len()
        );
        Ok(booking)
    }

    fn get_booking(&self, id: &str) -> Option<Booking> {
        self.bookings.iter().find(|booking| booking.id == id).cloned()
    }

    fn list_bookings(&self, query: &BookingListQuery) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|booking| query.matches(booking))
            .cloned()
            .collect()
    }

    fn update_booking(&mut self, id: &str, fields: BookingFields) -> RepoResult<Booking> {
        let index = self
            .position(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        let mut updated = self.bookings[index].clone();
        updated.replace_fields(fields)?;
        let previous = std::mem::replace(&mut self.bookings[index], updated.clone());

        if let Err(err) = self.persist("booking_update", id) {
            self.bookings[index] = previous;
            return Err(err);
        }

        info!("event=booking_update module=repo status=ok id={id}");
        Ok(updated)
    }

    fn delete_booking(&mut self, id: &str) -> RepoResult<Booking> {
        let index = self
            .position(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        let removed = self.bookings.remove(index);

        if let Err(err) = self.persist("booking_delete", id) {
            self.bookings.insert(index, removed);
            return Err(err);
        }

        info!(
            "event=booking_delete module=repo status=ok id={id} count={}",
            self.bookings.len()
        );
        Ok(removed)
    }

    fn delete_matching(
        &mut self,
        predicate: &dyn Fn(&Booking) -> bool,
    ) -> RepoResult<Vec<Booking>> {
        let (removed, kept): (Vec<Booking>, Vec<Booking>) =
            self.bookings.iter().cloned().partition(|booking| predicate(booking));
        if removed.is_empty() {
            return Ok(removed);
        }

        let previous = std::mem::replace(&mut self.bookings, kept);
        if let Err(err) = self.persist("booking_purge", "-") {
            self.bookings = previous;
            return Err(err);
        }

        info!(
            "event=booking_purge module=repo status=ok removed={} count={}",
            removed.len(),
            self.bookings.len()
        );
        Ok(removed)
    }
}
