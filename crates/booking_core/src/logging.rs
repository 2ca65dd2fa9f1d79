//! Logging bootstrap for the booking core.
//!
//! # Responsibility
//! - Start the process-wide `log` backend exactly once.
//! - Route records to size-rotated files, or to stderr for CLI runs.
//!
//! # Invariants
//! - Repeating `init_logging` with the same level and target is a no-op.
//! - A different level or target after the first init is rejected.
//! - Initialization never panics.
//! - File output is buffered; `flush_logging` must run before process exit.
//! - Log lines carry ids and counts only, never customer names or phones.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "booking";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    Directory(PathBuf),
}

impl LogTarget {
    fn describe(&self) -> String {
        match self {
            Self::Stderr => "stderr".to_string(),
            Self::Directory(dir) => dir.display().to_string(),
        }
    }
}

struct LoggingState {
    level: &'static str,
    target: LogTarget,
    logger: LoggerHandle,
}

/// Initializes logging with `level`, writing under `log_dir` or to stderr.
///
/// # Errors
/// - Unsupported `level`.
/// - `log_dir` that is not absolute or cannot be created.
/// - A previous init with a different level or target.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<(), String> {
    let level = normalize_level(level)?;
    let target = match log_dir {
        Some(dir) => LogTarget::Directory(normalize_log_dir(dir)?),
        None => LogTarget::Stderr,
    };

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, &target))?;
    ensure_same_config(state, level, &target)
}

/// Returns `(level, target)` once logging is active.
pub fn logging_status() -> Option<(&'static str, LogTarget)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.target.clone()))
}

/// Writes out buffered file records.
///
/// A no-op before `init_logging`. Call before a short-lived process exits;
/// the background flusher is not guaranteed to run again.
pub fn flush_logging() {
    if let Some(state) = LOGGING_STATE.get() {
        state.logger.flush();
    }
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, target: &LogTarget) -> Result<LoggingState, String> {
    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

    let logger = match target {
        LogTarget::Stderr => logger.format(flexi_logger::detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    let handle = logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook_once();
    info!(
        "event=core_init module=logging status=ok level={} target={} version={}",
        level,
        target.describe(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        level,
        target: target.clone(),
        logger: handle,
    })
}

fn ensure_same_config(
    state: &LoggingState,
    level: &'static str,
    target: &LogTarget,
) -> Result<(), String> {
    if &state.target != target {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.target.describe(),
            target.describe()
        ));
    }
    if state.level != level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        ));
    }
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(dir: &Path) -> Result<PathBuf, String> {
    if dir.as_os_str().is_empty() {
        return Err("log dir cannot be empty".to_string());
    }
    if !dir.is_absolute() {
        return Err(format!(
            "log dir must be an absolute path, got `{}`",
            dir.display()
        ));
    }
    Ok(dir.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

/// Flattens newlines and caps length so one event stays on one line.
pub(crate) fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
