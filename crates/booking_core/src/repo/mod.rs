//! Repository layer over the booking collection and the slot schedule.
//!
//! # Responsibility
//! - Define the CRUD contract used by services.
//! - Keep storage details (file format, write strategy) behind `BookingStorage`
//!   and `TimeSlotStorage`.
//!
//! # Invariants
//! - Every successful mutation is followed by a full rewrite of storage.
//! - Repository APIs return semantic errors (`NotFound`) alongside storage
//!   and validation errors.

pub mod booking_repo;
pub mod timeslot_repo;
