//! Booking domain model.
//!
//! # Responsibility
//! - Define the record shape shared by storage, repository and notifier.
//! - Define the time-slot schedule offered to customers.
//!
//! # Invariants
//! - Every booking is identified by a generated, never-reused `BookingId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod booking;
pub mod timeslot;
