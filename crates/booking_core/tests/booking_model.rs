use booking_core::{Booking, BookingFields, BookingStatus, BookingValidationError};
use serde_json::json;

fn fields(value: serde_json::Value) -> BookingFields {
    value.as_object().cloned().unwrap()
}

#[test]
fn booking_new_assigns_system_fields() {
    let booking = Booking::new(fields(json!({
        "firstName": "John",
        "date": "2023-03-25",
    })))
    .unwrap();

    assert!(booking.id.starts_with("booking_"));
    assert!(!booking.created_at.is_empty());
    assert!(chrono::DateTime::parse_from_rfc3339(&booking.created_at).is_ok());
    assert_eq!(booking.fields.len(), 2);
    assert_eq!(booking.date(), Some("2023-03-25"));
}

#[test]
fn booking_new_rejects_reserved_keys() {
    let err = Booking::new(fields(json!({ "id": "mine", "firstName": "John" }))).unwrap_err();
    assert_eq!(err, BookingValidationError::ReservedField("id".to_string()));

    let err = Booking::new(fields(json!({ "created_at": "yesterday" }))).unwrap_err();
    assert_eq!(
        err,
        BookingValidationError::ReservedField("created_at".to_string())
    );
}

#[test]
fn with_id_rejects_blank_system_fields() {
    let err = Booking::with_id(" ", "2023-03-25T10:00:00Z", BookingFields::new()).unwrap_err();
    assert_eq!(err, BookingValidationError::EmptyId);

    let err = Booking::with_id("booking_1", "", BookingFields::new()).unwrap_err();
    assert!(matches!(err, BookingValidationError::EmptyCreatedAt { .. }));
}

#[test]
fn replace_fields_keeps_identity() {
    let mut booking = Booking::new(fields(json!({ "time": "10:00 AM" }))).unwrap();
    let id = booking.id.clone();
    let created_at = booking.created_at.clone();

    booking
        .replace_fields(fields(json!({ "time": "2:00 PM", "status": "confirmed" })))
        .unwrap();

    assert_eq!(booking.id, id);
    assert_eq!(booking.created_at, created_at);
    assert_eq!(booking.field_str("time"), Some("2:00 PM"));
    assert_eq!(booking.status(), Some(BookingStatus::Confirmed));
}

#[test]
fn serialization_is_flat_with_system_fields_first() {
    let booking = Booking::with_id(
        "booking_abc",
        "2023-03-25T10:00:00.000Z",
        fields(json!({ "lastName": "Smith", "firstName": "John" })),
    )
    .unwrap();

    let text = serde_json::to_string(&booking).unwrap();
    assert_eq!(
        text,
        r#"{"id":"booking_abc","created_at":"2023-03-25T10:00:00.000Z","lastName":"Smith","firstName":"John"}"#
    );

    let decoded: Booking = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, booking);
}

#[test]
fn appointment_date_parses_iso_days_only() {
    let booking = Booking::new(fields(json!({ "date": "2023-03-25" }))).unwrap();
    assert_eq!(
        booking.appointment_date(),
        chrono::NaiveDate::from_ymd_opt(2023, 3, 25)
    );

    let booking = Booking::new(fields(json!({ "date": "March 25" }))).unwrap();
    assert_eq!(booking.appointment_date(), None);
}
