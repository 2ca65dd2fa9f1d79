//! Outbound notifications for newly created bookings.
//!
//! # Responsibility
//! - Define the `BookingNotifier` port the service calls after a create.
//! - Provide the SMTP adapter and a disabled adapter.
//!
//! # Invariants
//! - Notifier failures never undo or fail the booking mutation.
//! - Message bodies are built from the record only; no credentials or
//!   transport details leak into them.

use crate::model::booking::Booking;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod message;
pub mod smtp;

pub use message::NotificationMessage;
pub use smtp::SmtpNotifier;

#[derive(Debug)]
pub enum NotifyError {
    /// Sender or recipient address cannot be parsed.
    Address(String),
    /// The email could not be assembled.
    Build(String),
    /// The relay rejected the message or was unreachable.
    Transport(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Address(message) => write!(f, "invalid notification address: {message}"),
            Self::Build(message) => write!(f, "failed to build notification: {message}"),
            Self::Transport(message) => write!(f, "notification transport failed: {message}"),
        }
    }
}

impl Error for NotifyError {}

/// Outcome of the best-effort notification attached to a create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum NotificationStatus {
    Sent,
    Failed(String),
    Disabled,
}

impl NotificationStatus {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Port invoked once per successfully persisted booking.
pub trait BookingNotifier {
    fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError>;

    /// Disabled notifiers are skipped and reported as `Disabled`.
    fn is_enabled(&self) -> bool {
        true
    }
}

impl<T: BookingNotifier + ?Sized> BookingNotifier for Box<T> {
    fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError> {
        (**self).booking_created(booking)
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// Notifier used when notifications are turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl BookingNotifier for NoopNotifier {
    fn booking_created(&self, _booking: &Booking) -> Result<(), NotifyError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
