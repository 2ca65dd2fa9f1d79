use booking_core::{
    Booking, BookingFields, NotificationMessage, NotifyError, SecretString, SmtpConfig,
    SmtpNotifier,
};
use serde_json::json;

fn booking(value: serde_json::Value) -> Booking {
    let fields: BookingFields = value.as_object().cloned().unwrap();
    Booking::with_id("booking_123", "2023-03-20T09:00:00.000Z", fields).unwrap()
}

fn smtp_config() -> SmtpConfig {
    SmtpConfig {
        host: "smtp.example.com".to_string(),
        port: 587,
        username: "alerts@example.com".to_string(),
        password: SecretString::new("app-password"),
        from_name: Some("Shop Alerts".to_string()),
        from_address: None,
        to: "5550001111@sms.example.com".to_string(),
        timeout_secs: 10,
    }
}

#[test]
fn message_prefers_instagram_over_phone() {
    let message = NotificationMessage::for_booking(
        &booking(json!({
            "firstName": "John",
            "lastName": "Smith",
            "instagram": "@@johnsmith",
            "phone": "555-123-4567",
            "service": "Fade",
            "date": "2023-03-25",
            "time": "10:00 AM",
        })),
        "Haircut - $15",
    );

    assert_eq!(message.subject, "New Appointment Request");
    assert_eq!(
        message.body,
        "New Appointment Request:\n\
         ID: booking_123\n\
         Name: John Smith\n\
         Instagram: @johnsmith\n\
         Service: Fade\n\
         Date: 2023-03-25\n\
         Time: 10:00 AM"
    );
}

#[test]
fn message_falls_back_to_phone_and_default_service() {
    let message = NotificationMessage::for_booking(
        &booking(json!({
            "firstName": "Jane",
            "instagram": "",
            "phone": "555-123-4567",
            "date": "2023-03-25",
            "time": "2:00 PM",
        })),
        "Haircut - $15",
    );

    assert!(message.body.contains("Name: Jane\n"));
    assert!(message.body.contains("Phone: 555-123-4567\n"));
    assert!(!message.body.contains("Instagram"));
    assert!(message.body.contains("Service: Haircut - $15\n"));
}

#[test]
fn message_marks_missing_contact_details() {
    let message = NotificationMessage::for_booking(&booking(json!({})), "Haircut");

    assert!(message.body.contains("Name: not provided\n"));
    assert!(message.body.contains("Phone: not provided\n"));
    assert!(message.body.ends_with("Time: not provided"));
}

#[test]
fn smtp_notifier_builds_without_connecting() {
    assert!(SmtpNotifier::from_config(&smtp_config(), "Haircut").is_ok());
}

#[test]
fn smtp_notifier_rejects_bad_recipient() {
    let mut config = smtp_config();
    config.to = "not an address".to_string();

    let err = SmtpNotifier::from_config(&config, "Haircut").err().unwrap();
    assert!(matches!(err, NotifyError::Address(_)));
}

#[test]
fn smtp_notifier_rejects_bad_sender() {
    let mut config = smtp_config();
    config.username = "alerts".to_string();

    let err = SmtpNotifier::from_config(&config, "Haircut").err().unwrap();
    assert!(matches!(err, NotifyError::Address(_)));
}
