use std::sync::{Arc, Mutex};

use strum::{AsRefStr, Display, EnumIter};

/// Severity of a diagnostic message reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr, EnumIter)]
pub enum LogLevel {
    #[strum(serialize = "DEBUG")]
    Debug,
    #[strum(serialize = "INFO")]
    Info,
    #[strum(serialize = "WARN")]
    Warn,
    #[strum(serialize = "ERROR")]
    Error,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Append-only sink the engine writes its diagnostics into.
///
/// Clones share the same buffer, so the host keeps one handle and registers another with the
/// engine. Records stay structured here; framing them into a flat string is the host's job.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    inner: Arc<Mutex<Vec<LogRecord>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let mut q = self.inner.lock().expect("log sink poisoned");
        q.push(LogRecord { level, message: message.into() });
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("log sink poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every record written so far, leaving the sink empty.
    pub fn drain(&self) -> Vec<LogRecord> {
        let mut q = self.inner.lock().expect("log sink poisoned");
        std::mem::take(&mut *q)
    }

    pub fn clear(&self) {
        self.inner.lock().expect("log sink poisoned").clear();
    }

    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.inner.lock().expect("log sink poisoned").clone()
    }
}
