//! plwasm
//!
//! Host boundary around a pattern language engine. A host binds bytes, runs a script and gets
//! back two strings: a sentinel-framed diagnostic transcript and a JSON schema describing the
//! evaluated values marked as editable properties.
//!
//! The engine itself is anything implementing [`PatternEngine`]; this crate only drives it.

pub mod collector;
pub mod config;
pub mod error;
pub mod ffi;
pub mod schema;
pub mod session;
pub mod transcript;

pub use plwasm_engine as engine;
pub use plwasm_engine::PatternEngine;

pub use collector::{collect, PropertyNode, PROPERTY_ATTRIBUTE};
pub use config::{LoggerConfig, SessionConfig, SessionConfigBuilder, SessionConfigReader};
pub use error::SessionError;
pub use schema::{project, SchemaDocument};
pub use session::{RunOutcome, Session, SessionState};
pub use transcript::{split_transcript, Transcript, TranscriptLine, TranscriptRecord, SENTINEL};
