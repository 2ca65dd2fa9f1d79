//! Booking domain model.
//!
//! # Responsibility
//! - Define the canonical appointment record persisted by the store.
//! - Own the system-assigned fields (`id`, `created_at`) and keep callers
//!   from overwriting them.
//!
//! # Invariants
//! - `id` is generated once and never reused for another booking.
//! - `created_at` is set once at creation and survives every update.
//! - Caller fields never contain the reserved `id` / `created_at` keys.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a booking.
///
/// Kept as a type alias so persisted ids written by older tooling remain
/// readable as-is.
pub type BookingId = String;

/// Schema-free caller-supplied booking fields, in insertion order.
pub type BookingFields = Map<String, Value>;

pub const FIELD_ID: &str = "id";
pub const FIELD_CREATED_AT: &str = "created_at";
pub const FIELD_DATE: &str = "date";
pub const FIELD_TIME: &str = "time";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_INSTAGRAM: &str = "instagram";
pub const FIELD_FIRST_NAME: &str = "firstName";
pub const FIELD_LAST_NAME: &str = "lastName";
pub const FIELD_SERVICE: &str = "service";

const RESERVED_FIELDS: [&str; 2] = [FIELD_ID, FIELD_CREATED_AT];
const BOOKING_ID_PREFIX: &str = "booking_";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p"];

/// Validation failures for booking records and caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingValidationError {
    ReservedField(String),
    EmptyId,
    EmptyCreatedAt { id: BookingId },
    DuplicateId(BookingId),
}

impl Display for BookingValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReservedField(key) => {
                write!(f, "field `{key}` is system-assigned and cannot be set")
            }
            Self::EmptyId => write!(f, "booking id cannot be empty"),
            Self::EmptyCreatedAt { id } => {
                write!(f, "booking {id} is missing a created_at timestamp")
            }
            Self::DuplicateId(id) => write!(f, "duplicate booking id: {id}"),
        }
    }
}

impl Error for BookingValidationError {}

/// Lifecycle state carried in the optional `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Parses a `status` field value; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Canonical appointment record.
///
/// Serialized as one flat JSON object: `id`, `created_at`, then the caller
/// fields in the order they were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub created_at: String,
    #[serde(flatten)]
    pub fields: BookingFields,
}

impl Booking {
    /// Creates a booking with a fresh id and the current UTC timestamp.
    ///
    /// # Errors
    /// - Returns `ReservedField` when `fields` tries to set `id` or
    ///   `created_at`.
    pub fn new(fields: BookingFields) -> Result<Self, BookingValidationError> {
        Self::with_id(new_booking_id(), now_timestamp(), fields)
    }

    /// Creates a booking with caller-provided system fields.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: impl Into<BookingId>,
        created_at: impl Into<String>,
        fields: BookingFields,
    ) -> Result<Self, BookingValidationError> {
        ensure_no_reserved_fields(&fields)?;
        let booking = Self {
            id: id.into(),
            created_at: created_at.into(),
            fields,
        };
        booking.validate()?;
        Ok(booking)
    }

    /// Checks the record-level invariants.
    pub fn validate(&self) -> Result<(), BookingValidationError> {
        if self.id.trim().is_empty() {
            return Err(BookingValidationError::EmptyId);
        }
        if self.created_at.trim().is_empty() {
            return Err(BookingValidationError::EmptyCreatedAt {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Replaces every caller field, keeping `id` and `created_at`.
    pub fn replace_fields(&mut self, fields: BookingFields) -> Result<(), BookingValidationError> {
        ensure_no_reserved_fields(&fields)?;
        self.fields = fields;
        Ok(())
    }

    /// Returns a caller field as text when it is a non-empty string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn date(&self) -> Option<&str> {
        self.field_str(FIELD_DATE)
    }

    /// Parses the `date` field as `YYYY-MM-DD`.
    pub fn appointment_date(&self) -> Option<NaiveDate> {
        self.date().and_then(parse_booking_date)
    }

    /// Parses the `time` field as `HH:MM[:SS]` or `h:MM AM/PM`.
    pub fn appointment_time(&self) -> Option<NaiveTime> {
        self.field_str(FIELD_TIME).and_then(parse_booking_time)
    }

    /// Date and time the appointment starts, when both fields parse.
    pub fn appointment_start(&self) -> Option<NaiveDateTime> {
        Some(self.appointment_date()?.and_time(self.appointment_time()?))
    }

    pub fn phone(&self) -> Option<&str> {
        self.field_str(FIELD_PHONE)
    }

    pub fn instagram(&self) -> Option<&str> {
        self.field_str(FIELD_INSTAGRAM)
    }

    /// Returns the raw `status` text when present.
    pub fn status_text(&self) -> Option<&str> {
        self.field_str(FIELD_STATUS)
    }

    /// Returns the parsed status; a missing status counts as pending.
    pub fn status(&self) -> Option<BookingStatus> {
        match self.status_text() {
            Some(value) => BookingStatus::parse(value),
            None => Some(BookingStatus::Pending),
        }
    }
}

/// Generates a collision-free booking id.
pub fn new_booking_id() -> BookingId {
    format!("{BOOKING_ID_PREFIX}{}", Uuid::new_v4().simple())
}

/// Parses a `YYYY-MM-DD` date string.
pub fn parse_booking_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Parses a 24-hour (`14:00`, `14:00:00`) or 12-hour (`2:00 PM`) time.
pub fn parse_booking_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

/// Checks collection-level invariants: valid records and unique ids.
pub fn validate_collection(bookings: &[Booking]) -> Result<(), BookingValidationError> {
    let mut seen = HashSet::with_capacity(bookings.len());
    for booking in bookings {
        booking.validate()?;
        if !seen.insert(booking.id.as_str()) {
            return Err(BookingValidationError::DuplicateId(booking.id.clone()));
        }
    }
    Ok(())
}

fn ensure_no_reserved_fields(fields: &BookingFields) -> Result<(), BookingValidationError> {
    match RESERVED_FIELDS.iter().find(|key| fields.contains_key(**key)) {
        Some(key) => Err(BookingValidationError::ReservedField((*key).to_string())),
        None => Ok(()),
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::{new_booking_id, parse_booking_time, Booking, BookingFields, BookingStatus};
    use chrono::NaiveTime;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> BookingFields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn generated_ids_carry_prefix_and_differ() {
        let first = new_booking_id();
        let second = new_booking_id();
        assert!(first.starts_with("booking_"));
        assert_eq!(first.len(), "booking_".len() + 32);
        assert_ne!(first, second);
    }

    #[test]
    fn status_defaults_to_pending_and_rejects_unknown() {
        let booking = Booking::new(fields(json!({ "firstName": "Ann" }))).unwrap();
        assert_eq!(booking.status(), Some(BookingStatus::Pending));

        let booking = Booking::new(fields(json!({ "status": "no-show" }))).unwrap();
        assert_eq!(booking.status(), None);
    }

    #[test]
    fn booking_time_accepts_24_and_12_hour_forms() {
        let two_pm = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        assert_eq!(parse_booking_time("14:00"), Some(two_pm));
        assert_eq!(parse_booking_time("14:00:00"), Some(two_pm));
        assert_eq!(parse_booking_time("2:00 PM"), Some(two_pm));
        assert_eq!(
            parse_booking_time("10:00 AM"),
            NaiveTime::from_hms_opt(10, 0, 0)
        );
        assert_eq!(parse_booking_time("after lunch"), None);
    }

    #[test]
    fn appointment_start_needs_date_and_time() {
        let booking =
            Booking::new(fields(json!({ "date": "2023-03-25", "time": "10:00 AM" }))).unwrap();
        assert_eq!(
            booking.appointment_start().unwrap().to_string(),
            "2023-03-25 10:00:00"
        );

        let booking = Booking::new(fields(json!({ "date": "2023-03-25" }))).unwrap();
        assert_eq!(booking.appointment_start(), None);
    }

    #[test]
    fn field_str_ignores_blank_and_non_string_values() {
        let booking = Booking::new(fields(json!({ "phone": "  ", "time": 10 }))).unwrap();
        assert_eq!(booking.phone(), None);
        assert_eq!(booking.field_str("time"), None);
    }
}
