//! Durable storage for the booking collection and the slot schedule.
//!
//! # Responsibility
//! - Read the whole booking collection (or slot schedule) at startup.
//! - Rewrite the whole document after every mutation.
//!
//! # Invariants
//! - A missing storage location is an empty document, never an error.
//! - Malformed content is reported as `StorageError::Corrupt` unless the
//!   backend is configured with `CorruptPolicy::Reset`.
//! - Backends never leave a half-written collection behind.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::model::booking::Booking;
use crate::model::timeslot::TimeSlotSchedule;

mod json_file;
mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Corrupt {
        path: PathBuf,
        message: String,
    },
    Serialize(String),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error at {}: {source}", path.display()),
            Self::Corrupt { path, message } => {
                write!(f, "corrupt store at {}: {message}", path.display())
            }
            Self::Serialize(message) => write!(f, "failed to serialize store: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Corrupt { .. } => None,
            Self::Serialize(_) => None,
        }
    }
}

/// What to do when persisted content cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptPolicy {
    /// Refuse to load; the file is left untouched.
    #[default]
    Fail,
    /// Move the bad file aside and start from an empty document.
    Reset,
}

/// Whole-collection persistence contract.
pub trait BookingStorage {
    /// Reads the full collection in insertion order.
    fn load(&self) -> StorageResult<Vec<Booking>>;

    /// Replaces the persisted collection with `bookings`.
    fn save(&self, bookings: &[Booking]) -> StorageResult<()>;
}

/// Whole-schedule persistence contract for bookable slots.
pub trait TimeSlotStorage {
    fn load_slots(&self) -> StorageResult<TimeSlotSchedule>;

    fn save_slots(&self, schedule: &TimeSlotSchedule) -> StorageResult<()>;
}
