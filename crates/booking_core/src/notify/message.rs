//! Notification text for a new booking.
//!
//! # Invariants
//! - Instagram is preferred over phone when both are present.
//! - Instagram handles are rendered with exactly one leading `@`.
//! - Missing fields never abort composition; they render as placeholders.

use crate::model::booking::{Booking, FIELD_FIRST_NAME, FIELD_LAST_NAME, FIELD_SERVICE, FIELD_TIME};

pub const NEW_BOOKING_SUBJECT: &str = "New Appointment Request";
const MISSING_VALUE: &str = "not provided";

/// Subject and plain-text body of one outbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    /// Summarizes `booking` for the business owner.
    ///
    /// `default_service` is shown when the booking has no `service` field.
    pub fn for_booking(booking: &Booking, default_service: &str) -> Self {
        let mut lines = vec![
            format!("{NEW_BOOKING_SUBJECT}:"),
            format!("ID: {}", booking.id),
            format!("Name: {}", display_name(booking)),
        ];

        match booking.instagram().and_then(normalize_instagram_handle) {
            Some(handle) => lines.push(format!("Instagram: @{handle}")),
            None => lines.push(format!(
                "Phone: {}",
                booking.phone().unwrap_or(MISSING_VALUE)
            )),
        }

        let service = booking
            .field_str(FIELD_SERVICE)
            .unwrap_or(default_service);
        lines.push(format!("Service: {service}"));
        lines.push(format!("Date: {}", booking.date().unwrap_or(MISSING_VALUE)));
        lines.push(format!(
            "Time: {}",
            booking.field_str(FIELD_TIME).unwrap_or(MISSING_VALUE)
        ));

        Self {
            subject: NEW_BOOKING_SUBJECT.to_string(),
            body: lines.join("\n"),
        }
    }
}

/// Strips leading `@` characters; returns `None` when nothing is left.
pub fn normalize_instagram_handle(handle: &str) -> Option<&str> {
    let cleaned = handle.trim().trim_start_matches('@');
    (!cleaned.is_empty()).then_some(cleaned)
}

fn display_name(booking: &Booking) -> String {
    let parts: Vec<&str> = [FIELD_FIRST_NAME, FIELD_LAST_NAME]
        .into_iter()
        .filter_map(|key| booking.field_str(key))
        .collect();
    if parts.is_empty() {
        MISSING_VALUE.to_string()
    } else {
        parts.join(" ")
    }
}
