use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_u8(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        write!(f, "{}", label)
    }
}

/// A single log line as handed to the installed sink.
#[derive(Clone, Copy, Debug)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    pub subsystem: &'a str,
    pub message: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedLogRecord {
    pub level: LogLevel,
    pub subsystem: String,
    pub message: String,
}

type Logger = Box<dyn Fn(&LogRecord<'_>) + Send + Sync + 'static>;

fn default_logger(record: &LogRecord<'_>) {
    eprintln!(
        "[{}] {}: {}",
        record.level, record.subsystem, record.message
    );
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn logger_cell() -> &'static Mutex<Logger> {
    static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();
    LOGGER.get_or_init(|| Mutex::new(Box::new(default_logger)))
}

static MAX_LEVEL: AtomicU8 = AtomicU8::new(2);

pub fn set_logger(logger: impl Fn(&LogRecord<'_>) + Send + Sync + 'static) {
    let mut guard = lock_unpoisoned(logger_cell());
    *guard = Box::new(logger);
}

pub fn reset_logger() {
    set_logger(default_logger);
}

/// Records at a level more verbose than `level` are dropped before reaching the sink.
pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level.as_u8(), Ordering::Relaxed);
}

pub fn max_level() -> LogLevel {
    match MAX_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Error,
        1 => LogLevel::Warn,
        2 => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

pub fn enabled(level: LogLevel) -> bool {
    level.as_u8() <= MAX_LEVEL.load(Ordering::Relaxed)
}

pub fn log(level: LogLevel, subsystem: &str, message: impl AsRef<str>) {
    if !enabled(level) {
        return;
    }
    let record = LogRecord {
        level,
        subsystem,
        message: message.as_ref(),
    };
    let guard = lock_unpoisoned(logger_cell());
    (guard)(&record);
}

pub fn error(subsystem: &str, message: impl AsRef<str>) {
    log(LogLevel::Error, subsystem, message);
}

pub fn warn(subsystem: &str, message: impl AsRef<str>) {
    log(LogLevel::Warn, subsystem, message);
}

pub fn info(subsystem: &str, message: impl AsRef<str>) {
    log(LogLevel::Info, subsystem, message);
}

pub fn debug(subsystem: &str, message: impl AsRef<str>) {
    log(LogLevel::Debug, subsystem, message);
}

/// Installs a sink that appends every record to the returned buffer.
pub fn capture() -> Arc<Mutex<Vec<OwnedLogRecord>>> {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buffer);
    set_logger(move |record| {
        lock_unpoisoned(&sink).push(OwnedLogRecord {
            level: record.level,
            subsystem: record.subsystem.to_string(),
            message: record.message.to_string(),
        });
    });
    buffer
}
