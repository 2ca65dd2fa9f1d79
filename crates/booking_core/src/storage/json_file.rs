//! JSON file backend.
//!
//! # Responsibility
//! - Persist the booking collection as one pretty-printed JSON array, or
//!   the slot schedule as one pretty-printed JSON object.
//! - Emit `store_load` / `store_save` logging events with duration and status.
//!
//! # Invariants
//! - Writes go to `<file>.tmp` first and are renamed over the target.
//! - An empty (whitespace-only) file decodes to an empty document.
//! - Under `CorruptPolicy::Reset` the bad file is kept as
//!   `<file>.corrupt-<timestamp>` instead of being overwritten.

use super::{BookingStorage, CorruptPolicy, StorageError, StorageResult, TimeSlotStorage};
use crate::model::booking::{validate_collection, Booking};
use crate::model::timeslot::TimeSlotSchedule;
use chrono::Utc;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Whole-file document kinds this backend knows how to store.
trait JsonDocument: DeserializeOwned + Default {
    const KIND: &'static str;

    fn check(&self) -> Result<(), String>;

    fn count(&self) -> usize;
}

impl JsonDocument for Vec<Booking> {
    const KIND: &'static str = "bookings";

    fn check(&self) -> Result<(), String> {
        validate_collection(self).map_err(|err| err.to_string())
    }

    fn count(&self) -> usize {
        self.len()
    }
}

impl JsonDocument for TimeSlotSchedule {
    const KIND: &'static str = "timeslots";

    fn check(&self) -> Result<(), String> {
        Ok(())
    }

    fn count(&self) -> usize {
        self.slot_count()
    }
}

/// Storage backed by a single JSON file.
///
/// One instance per file: the booking collection and the slot schedule
/// live in separate files.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
    corrupt_policy: CorruptPolicy,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            corrupt_policy: CorruptPolicy::default(),
        }
    }

    pub fn with_corrupt_policy(mut self, policy: CorruptPolicy) -> Self {
        self.corrupt_policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn corrupt_policy(&self) -> CorruptPolicy {
        self.corrupt_policy
    }

    fn temp_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".tmp")
    }

    fn quarantine(&self) -> StorageResult<PathBuf> {
        let suffix = format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ"));
        let target = sibling_with_suffix(&self.path, &suffix);
        fs::rename(&self.path, &target).map_err(|err| StorageError::io(&self.path, err))?;
        Ok(target)
    }

    fn read_document<T: JsonDocument>(&self) -> StorageResult<T> {
        let started_at = Instant::now();
        info!(
            "event=store_load module=storage status=start backend=json_file document={}",
            T::KIND
        );

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=store_load module=storage status=ok document={} duration_ms={} count=0 reason=missing",
                    T::KIND,
                    started_at.elapsed().as_millis()
                );
                return Ok(T::default());
            }
            Err(err) => {
                error!(
                    "event=store_load module=storage status=error document={} duration_ms={} error_code=store_read_failed error={}",
                    T::KIND,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(StorageError::io(&self.path, err));
            }
        };

        match decode::<T>(&content) {
            Ok(document) => {
                info!(
                    "event=store_load module=storage status=ok document={} duration_ms={} count={}",
                    T::KIND,
                    started_at.elapsed().as_millis(),
                    document.count()
                );
                Ok(document)
            }
            Err(message) => self.handle_corrupt::<T>(message, started_at),
        }
    }

    fn handle_corrupt<T: JsonDocument>(
        &self,
        message: String,
        started_at: Instant,
    ) -> StorageResult<T> {
        match self.corrupt_policy {
            CorruptPolicy::Fail => {
                error!(
                    "event=store_load module=storage status=error document={} duration_ms={} error_code=store_corrupt policy=fail error={}",
                    T::KIND,
                    started_at.elapsed().as_millis(),
                    message
                );
                Err(StorageError::corrupt(&self.path, message))
            }
            CorruptPolicy::Reset => {
                let backup = self.quarantine()?;
                warn!(
                    "event=store_load module=storage status=reset document={} duration_ms={} error_code=store_corrupt policy=reset backup={} error={}",
                    T::KIND,
                    started_at.elapsed().as_millis(),
                    backup.display(),
                    message
                );
                Ok(T::default())
            }
        }
    }

    fn write_document<T: Serialize + ?Sized>(
        &self,
        kind: &str,
        document: &T,
        count: usize,
    ) -> StorageResult<()> {
        let started_at = Instant::now();

        let result = write_atomically(&self.path, &self.temp_path(), document);
        match &result {
            Ok(()) => info!(
                "event=store_save module=storage status=ok document={kind} duration_ms={} count={count}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_save module=storage status=error document={kind} duration_ms={} count={count} error_code=store_write_failed error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

impl BookingStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<Vec<Booking>> {
        self.read_document()
    }

    fn save(&self, bookings: &[Booking]) -> StorageResult<()> {
        self.write_document(<Vec<Booking> as JsonDocument>::KIND, bookings, bookings.len())
    }
}

impl TimeSlotStorage for JsonFileStorage {
    fn load_slots(&self) -> StorageResult<TimeSlotSchedule> {
        self.read_document()
    }

    fn save_slots(&self, schedule: &TimeSlotSchedule) -> StorageResult<()> {
        self.write_document(TimeSlotSchedule::KIND, schedule, schedule.slot_count())
    }
}

fn decode<T: JsonDocument>(content: &str) -> Result<T, String> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    let document: T = serde_json::from_str(content).map_err(|err| err.to_string())?;
    document.check()?;
    Ok(document)
}

fn write_atomically<T: Serialize + ?Sized>(
    path: &Path,
    temp_path: &Path,
    document: &T,
) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
    }

    let mut content = serde_json::to_string_pretty(document)
        .map_err(|err| StorageError::Serialize(err.to_string()))?;
    content.push('\n');

    fs::write(temp_path, content).map_err(|err| StorageError::io(temp_path, err))?;
    if let Err(err) = fs::rename(temp_path, path) {
        let _ = fs::remove_file(temp_path);
        return Err(StorageError::io(path, err));
    }
    Ok(())
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store.json"));
    name.push(suffix);
    path.with_file_name(name)
}
