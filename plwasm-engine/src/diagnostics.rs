use std::fmt;

/// Where in the submitted source a compile error points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub source: String,
    pub line: u32,
    pub column: u32,
}

/// A compile-time diagnostic (lexing, parsing, validation).
///
/// `Display` produces the engine's formatted form, which is what ends up in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub message: String,
    pub description: Option<String>,
    pub location: Option<SourceLocation>,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), description: None, location: None }
    }

    pub fn at(mut self, source: impl Into<String>, line: u32, column: u32) -> Self {
        self.location = Some(SourceLocation { source: source.into(), line, column });
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message)?;
        if let Some(loc) = &self.location {
            write!(f, "\n  -->   in {}:{}:{}", loc.source, loc.line, loc.column)?;
        }
        if let Some(desc) = &self.description {
            write!(f, "\n\n{desc}")?;
        }
        Ok(())
    }
}

/// The single located error that stopped evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl EvalError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self { line, column, message: message.into() }
    }
}

/// An unstructured failure of the engine itself, outside its compile/eval error channels.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{description}")]
pub struct EngineFault {
    pub description: String,
}

impl EngineFault {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into() }
    }
}

impl From<anyhow::Error> for EngineFault {
    fn from(e: anyhow::Error) -> Self {
        Self::new(format!("{e:#}"))
    }
}
