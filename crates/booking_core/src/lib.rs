//! Core appointment booking logic.
//! This crate owns the booking record invariants, persistence, the bookable
//! slot schedule and the new-booking notification hook.

pub mod config;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod search;
pub mod service;
pub mod storage;

pub use config::{AppConfig, ConfigError, SecretString, SmtpConfig};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status, LogTarget};
pub use model::booking::{
    parse_booking_time, Booking, BookingFields, BookingId, BookingStatus, BookingValidationError,
};
pub use model::timeslot::{SlotRange, TimeSlotError, TimeSlotSchedule};
pub use notify::{
    BookingNotifier, NoopNotifier, NotificationMessage, NotificationStatus, NotifyError,
    SmtpNotifier,
};
pub use repo::booking_repo::{
    BookingListQuery, BookingRepository, RepoError, RepoResult, StoredBookingRepository,
};
pub use repo::timeslot_repo::{StoredTimeSlotRepository, TimeSlotRepository};
pub use search::phone::{PhoneQuery, SearchError};
pub use service::booking_service::{AddedBooking, BookingService};
pub use service::cleanup::{BookingStats, PurgeCutoff, PurgeRequest};
pub use storage::{
    BookingStorage, CorruptPolicy, JsonFileStorage, MemoryStorage, StorageError, StorageResult,
    TimeSlotStorage,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
