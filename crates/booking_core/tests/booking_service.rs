use booking_core::{
    Booking, BookingFields, BookingNotifier, BookingService, BookingStatus, MemoryStorage,
    NoopNotifier, NotificationStatus, NotifyError, PurgeRequest, RepoError, SearchError,
    StoredBookingRepository,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn fields(value: serde_json::Value) -> BookingFields {
    value.as_object().cloned().unwrap()
}

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn moment(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Rc<RefCell<Vec<String>>>,
}

impl BookingNotifier for RecordingNotifier {
    fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push(booking.id.clone());
        Ok(())
    }
}

struct FailingNotifier;

impl BookingNotifier for FailingNotifier {
    fn booking_created(&self, _booking: &Booking) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("relay unreachable".to_string()))
    }
}

type Service<N> = BookingService<StoredBookingRepository<MemoryStorage>, N>;

fn service_with<N: BookingNotifier>(notifier: N) -> (Service<N>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let repo = StoredBookingRepository::open(storage.clone()).unwrap();
    (BookingService::new(repo, notifier), storage)
}

fn john() -> BookingFields {
    fields(json!({
        "firstName": "John",
        "lastName": "Smith",
        "instagram": "@johnsmith",
        "service": "haircut",
        "date": "2023-03-25",
        "time": "10:00 AM",
    }))
}

fn jane() -> BookingFields {
    fields(json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "phone": "555-123-4567",
        "service": "haircut",
        "date": "2023-03-25",
        "time": "2:00 PM",
    }))
}

#[test]
fn two_bookings_on_same_day_scenario() {
    let (mut service, _storage) = service_with(NoopNotifier);

    let first = service.add_booking(john()).unwrap();
    let second = service.add_booking(jane()).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(first.notification, NotificationStatus::Disabled);

    assert_eq!(service.list_bookings(None).len(), 2);
    assert_eq!(service.list_bookings(Some("2023-03-25")).len(), 2);

    service.delete_booking(first.id()).unwrap();
    let remaining = service.list_bookings(None);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id());
}

#[test]
fn add_notifies_after_persisting() {
    let notifier = RecordingNotifier::default();
    let (mut service, storage) = service_with(notifier.clone());

    let added = service.add_booking(john()).unwrap();

    assert_eq!(added.notification, NotificationStatus::Sent);
    assert!(added.notification.is_sent());
    assert_eq!(*notifier.sent.borrow(), vec![added.booking.id.clone()]);
    assert_eq!(storage.snapshot(), vec![added.booking]);
}

#[test]
fn notifier_failure_does_not_fail_add() {
    let (mut service, storage) = service_with(FailingNotifier);

    let added = service.add_booking(john()).unwrap();

    match &added.notification {
        NotificationStatus::Failed(reason) => assert!(reason.contains("relay unreachable")),
        other => panic!("expected failed notification, got {other:?}"),
    }
    assert!(!added.notification.is_sent());
    assert_eq!(service.get_booking(added.id()), Some(added.booking.clone()));
    assert_eq!(storage.snapshot().len(), 1);
}

#[test]
fn persist_failure_skips_notification() {
    let notifier = RecordingNotifier::default();
    let (mut service, storage) = service_with(notifier.clone());
    storage.set_fail_writes(true);

    let err = service.add_booking(john()).unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert!(notifier.sent.borrow().is_empty());
    assert!(service.list_bookings(None).is_empty());
}

#[test]
fn update_then_get_returns_new_fields_with_original_identity() {
    let (mut service, _storage) = service_with(NoopNotifier);
    let added = service.add_booking(john()).unwrap();

    let updated = service.update_booking(added.id(), jane()).unwrap();
    let loaded = service.get_booking(added.id()).unwrap();

    assert_eq!(loaded, updated);
    assert_eq!(loaded.fields, jane());
    assert_eq!(loaded.created_at, added.booking.created_at);
}

#[test]
fn update_and_delete_unknown_report_not_found() {
    let (mut service, _storage) = service_with(NoopNotifier);
    service.add_booking(john()).unwrap();

    assert!(service
        .update_booking("booking_unknown", jane())
        .unwrap_err()
        .is_not_found());
    assert!(service
        .delete_booking("booking_unknown")
        .unwrap_err()
        .is_not_found());
    assert_eq!(service.list_bookings(None).len(), 1);
}

#[test]
fn find_by_phone_matches_any_formatting() {
    let (mut service, _storage) = service_with(NoopNotifier);
    service.add_booking(john()).unwrap();
    let jane = service.add_booking(jane()).unwrap();

    let hits = service.find_by_phone("(555) 123 4567").unwrap();
    assert_eq!(hits, vec![jane.booking]);

    assert!(service.find_by_phone("999-999-9999").unwrap().is_empty());
    assert!(matches!(
        service.find_by_phone("123"),
        Err(SearchError::InvalidQuery { .. })
    ));
}

#[test]
fn stats_count_statuses_and_past_bookings() {
    let (mut service, _storage) = service_with(NoopNotifier);
    service
        .add_booking(fields(json!({ "date": "2025-06-01", "status": "confirmed" })))
        .unwrap();
    service
        .add_booking(fields(json!({ "date": "2025-06-09", "status": "cancelled" })))
        .unwrap();
    service
        .add_booking(fields(json!({ "date": "2025-06-10" })))
        .unwrap();
    service
        .add_booking(fields(json!({ "date": "2025-06-20", "status": "no-show" })))
        .unwrap();

    let stats = service.stats(day("2025-06-10"));

    assert_eq!(stats.total, 4);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.confirmed, 1);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.other, 1);
    assert_eq!(stats.past, 2);
}

#[test]
fn purge_past_removes_only_dated_bookings_before_cutoff() {
    let (mut service, storage) = service_with(NoopNotifier);
    service
        .add_booking(fields(json!({ "date": "2025-06-01" })))
        .unwrap();
    let today = service
        .add_booking(fields(json!({ "date": "2025-06-10" })))
        .unwrap();
    let undated = service
        .add_booking(fields(json!({ "date": "next week" })))
        .unwrap();

    let removed = service
        .purge_past(&PurgeRequest::before(day("2025-06-10")))
        .unwrap();

    assert_eq!(removed.len(), 1);
    assert_eq!(
        service.list_bookings(None),
        vec![today.booking, undated.booking]
    );
    assert_eq!(storage.snapshot().len(), 2);
}

#[test]
fn purge_past_can_be_limited_to_statuses() {
    let (mut service, _storage) = service_with(NoopNotifier);
    let confirmed = service
        .add_booking(fields(json!({ "date": "2025-06-01", "status": "confirmed" })))
        .unwrap();
    let pending = service
        .add_booking(fields(json!({ "date": "2025-06-01" })))
        .unwrap();

    let request = PurgeRequest::older_than(day("2025-06-10"), 1)
        .with_statuses(vec![BookingStatus::Confirmed]);
    let removed = service.purge_past(&request).unwrap();

    assert_eq!(removed, vec![confirmed.booking]);
    assert_eq!(service.list_bookings(None), vec![pending.booking]);
}

#[test]
fn stored_fields_are_kept_as_submitted() {
    let (mut service, storage) = service_with(NoopNotifier);

    let added = service.add_booking(john()).unwrap();

    assert_eq!(added.booking.fields["instagram"], "@johnsmith");
    assert_eq!(storage.snapshot()[0].fields, john());
}

#[test]
fn purge_completed_uses_appointment_time() {
    let (mut service, _storage) = service_with(NoopNotifier);
    let morning = service
        .add_booking(fields(json!({ "date": "2025-06-10", "time": "9:00 AM" })))
        .unwrap();
    let afternoon = service
        .add_booking(fields(json!({ "date": "2025-06-10", "time": "13:30" })))
        .unwrap();
    let untimed = service
        .add_booking(fields(json!({ "date": "2025-06-01" })))
        .unwrap();

    let removed = service
        .purge_past(&PurgeRequest::completed(moment("2025-06-10 14:00"), 2))
        .unwrap();

    assert_eq!(removed, vec![morning.booking]);
    assert_eq!(
        service.list_bookings(None),
        vec![afternoon.booking, untimed.booking]
    );
}

#[test]
fn failed_purge_keeps_every_booking() {
    let (mut service, storage) = service_with(NoopNotifier);
    for date in ["2025-06-01", "2025-06-20", "2025-06-02"] {
        service.add_booking(fields(json!({ "date": date }))).unwrap();
    }
    let before = service.list_bookings(None);
    let saves_before = service.repository().storage().save_count();
    storage.set_fail_writes(true);

    let err = service
        .purge_past(&PurgeRequest::before(day("2025-06-10")))
        .unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert_eq!(service.list_bookings(None), before);
    assert_eq!(service.repository().len(), 3);
    assert_eq!(storage.save_count(), saves_before);
    assert_eq!(storage.snapshot(), before);
}
