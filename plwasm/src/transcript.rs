//! Diagnostic transcript and its flat-string framing.
//!
//! The host only receives one NUL-terminated string, so every record is rendered as text and
//! terminated by [`SENTINEL`]. Records keep their structure until [`Transcript::render`].

use std::fmt::{self, Write};

use plwasm_engine::{CompileError, EvalError, LogLevel, LogRecord};

/// Record separator of the rendered transcript.
pub const SENTINEL: char = '\x01';

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptRecord {
    Log(LogRecord),
    /// A compile error, already formatted by the engine.
    CompileError(String),
    EvalError(EvalError),
    Fault(String),
}

impl TranscriptRecord {
    fn write_to(&self, out: &mut String) -> fmt::Result {
        match self {
            TranscriptRecord::Log(record) => {
                let tag = format!("[{}]", record.level);
                write!(out, "{tag:<8}{}", sanitize(&record.message))?;
            }
            TranscriptRecord::CompileError(formatted) => out.push_str(&sanitize(formatted)),
            TranscriptRecord::EvalError(e) => {
                write!(out, "{}:{}  {}", e.line, e.column, sanitize(&e.message))?;
            }
            TranscriptRecord::Fault(description) => {
                write!(out, "[ERROR]: Exception thrown: {}", sanitize(description))?;
            }
        }
        out.push('\n');
        out.push(SENTINEL);
        Ok(())
    }
}

impl From<LogRecord> for TranscriptRecord {
    fn from(record: LogRecord) -> Self {
        TranscriptRecord::Log(record)
    }
}

impl From<&CompileError> for TranscriptRecord {
    fn from(e: &CompileError) -> Self {
        TranscriptRecord::CompileError(e.to_string())
    }
}

/// Keep record text from forging a separator or truncating the C string.
fn sanitize(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains([SENTINEL, '\0']) {
        text.replace([SENTINEL, '\0'], &REPLACEMENT.to_string()).into()
    } else {
        text.into()
    }
}

/// Ordered diagnostics of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    records: Vec<TranscriptRecord>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: impl Into<TranscriptRecord>) {
        self.records.push(record.into());
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[TranscriptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The flat, sentinel-framed form handed to the host.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Extend<LogRecord> for Transcript {
    fn extend<T: IntoIterator<Item = LogRecord>>(&mut self, iter: T) {
        self.records.extend(iter.into_iter().map(TranscriptRecord::Log));
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for record in &self.records {
            record.write_to(&mut out)?;
        }
        f.write_str(&out)
    }
}

/// One record recovered from a rendered transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    /// Level inferred from the bracketed prefix; `None` for compile/eval error records.
    pub level: Option<LogLevel>,
    pub text: String,
}

/// Host-side inverse of [`Transcript::render`]: split on the sentinel and classify each record.
pub fn split_transcript(rendered: &str) -> Vec<TranscriptLine> {
    rendered
        .split_terminator(SENTINEL)
        .map(|raw| {
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            TranscriptLine { level: level_of(text), text: text.to_string() }
        })
        .collect()
}

fn level_of(line: &str) -> Option<LogLevel> {
    [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error]
        .into_iter()
        .find(|level| {
            line.strip_prefix('[')
                .and_then(|rest| rest.strip_prefix(level.as_ref()))
                .is_some_and(|rest| rest.starts_with(']'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn log(level: LogLevel, message: &str) -> LogRecord {
        LogRecord { level, message: message.to_string() }
    }

    #[test]
    fn level_prefixes_are_padded_to_one_column() {
        let mut t = Transcript::new();
        t.extend([
            log(LogLevel::Debug, "d"),
            log(LogLevel::Info, "i"),
            log(LogLevel::Warn, "w"),
            log(LogLevel::Error, "e"),
        ]);
        assert_eq!(
            t.render(),
            "[DEBUG] d\n\x01[INFO]  i\n\x01[WARN]  w\n\x01[ERROR] e\n\x01"
        );
    }

    #[test]
    fn structured_records() {
        let mut t = Transcript::new();
        t.push(&CompileError::new("expected ';'").at("<Source Code>", 2, 7));
        t.push(TranscriptRecord::EvalError(EvalError::new(12, 3, "division by zero")));
        t.push(TranscriptRecord::Fault("bad_alloc".into()));
        assert_eq!(
            t.render(),
            "error: expected ';'\n  -->   in <Source Code>:2:7\n\x01\
             12:3  division by zero\n\x01\
             [ERROR]: Exception thrown: bad_alloc\n\x01"
        );
    }

    #[test]
    fn sentinel_in_message_cannot_split_a_record() {
        let mut t = Transcript::new();
        t.extend([log(LogLevel::Info, "a\x01b\0c"), log(LogLevel::Info, "multi\nline")]);

        let rendered = t.render();
        assert_eq!(rendered.matches(SENTINEL).count(), 2);
        assert!(!rendered.contains('\0'));

        let lines = split_transcript(&rendered);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "[INFO]  a\u{FFFD}b\u{FFFD}c");
        assert_eq!(lines[1].text, "[INFO]  multi\nline");
    }

    #[test]
    fn split_classifies_levels() {
        let rendered = "[DEBUG] x\n\x01[ERROR]: Exception thrown: boom\n\x014:2  oops\n\x01[WARN]  y\n\x01";
        let levels: Vec<Option<LogLevel>> = split_transcript(rendered).into_iter().map(|l| l.level).collect();
        assert_eq!(levels, [Some(LogLevel::Debug), Some(LogLevel::Error), None, Some(LogLevel::Warn)]);
    }

    #[test]
    fn empty_transcript_splits_to_nothing() {
        assert!(split_transcript("").is_empty());
        assert_eq!(Transcript::new().render(), "");
    }
}
