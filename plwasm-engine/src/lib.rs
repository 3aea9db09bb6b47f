//! plwasm-engine
//!
//! The interface a pattern evaluation engine has to provide so the plwasm host layer can drive it.
//! Nothing here parses or evaluates pattern scripts; an engine crate implements
//! [`engine::PatternEngine`] and the host layer only talks to it through that trait.

pub mod data;
pub mod diagnostics;
pub mod engine;
pub mod node;
pub mod sink;

/// Scripted engine used by tests and host prototyping (kept as a module, not a binary).
pub mod testing;

pub use data::DataSource;
pub use diagnostics::{CompileError, EngineFault, EvalError, SourceLocation};
pub use engine::{DangerousCall, DangerousCallHandler, PatternEngine};
pub use node::{Attribute, EnumEntry, Node, NodeKind};
pub use sink::{LogLevel, LogRecord, LogSink};
