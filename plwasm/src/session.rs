use bytes::Bytes;
use plwasm_engine::{DangerousCall, DataSource, EngineFault, LogSink, PatternEngine};

use crate::collector::{collect, PropertyNode, PROPERTY_ATTRIBUTE};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::schema::{project, SchemaDocument};
use crate::transcript::{Transcript, TranscriptRecord};

const ENGINE_LOG_TARGET: &str = "plwasm::engine";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Succeeded,
    CompileFailed,
    EvalFailed,
    ExceptionRaised,
}

/// How a run ended. Only [`RunOutcome::ExceptionRaised`] leaves the schema untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    CompileFailed,
    EvalFailed,
    ExceptionRaised,
}

impl From<RunOutcome> for SessionState {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Succeeded => SessionState::Succeeded,
            RunOutcome::CompileFailed => SessionState::CompileFailed,
            RunOutcome::EvalFailed => SessionState::EvalFailed,
            RunOutcome::ExceptionRaised => SessionState::ExceptionRaised,
        }
    }
}

/// Everything one host owns: the engine, the bound bytes and the results of the last run.
///
/// Runs are strictly sequential; every operation takes `&mut self`.
pub struct Session<E> {
    engine: E,
    config: SessionConfig,
    data: DataSource,
    sink: LogSink,
    transcript: Transcript,
    properties: Vec<PropertyNode>,
    schema: SchemaDocument,
    state: SessionState,
    initialized: bool,
}

impl<E: PatternEngine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, SessionConfig::default())
    }

    pub fn with_config(engine: E, config: SessionConfig) -> Self {
        Self {
            engine,
            config,
            data: DataSource::default(),
            sink: LogSink::new(),
            transcript: Transcript::new(),
            properties: Vec::new(),
            schema: SchemaDocument::default(),
            state: SessionState::Idle,
            initialized: false,
        }
    }

    /// Sandbox the engine and point it at the include roots.
    ///
    /// Dangerous function calls are always refused. `run` initializes on first use if the host
    /// never called this.
    pub fn initialize(&mut self) {
        self.engine.set_dangerous_call_handler(Box::new(|call: &DangerousCall| {
            log::warn!("refused dangerous function call '{}'", call.function);
            false
        }));
        self.engine.set_include_paths(self.config.include_paths.clone());
        self.initialized = true;
    }

    /// Replace the bytes scripts run against. Properties collected against the old bytes are
    /// dropped; the schema of the last run stays until the next one.
    pub fn bind(&mut self, bytes: impl Into<Bytes>) {
        self.data = DataSource::new(bytes);
        self.properties.clear();
        self.engine.set_data_source(self.data.clone());
        log::debug!("bound {} bytes of data", self.data.len());
    }

    /// Execute `script` against the bound bytes.
    ///
    /// Compile and evaluation failures end up in the transcript and still refresh the schema.
    /// An engine fault is recorded and leaves the previous schema in place.
    pub fn run(&mut self, script: &str) -> RunOutcome {
        if !self.initialized {
            self.initialize();
        }

        self.transcript.clear();
        self.properties.clear();
        self.sink.clear();
        self.state = SessionState::Running;
        self.engine.set_log_sink(self.sink.clone());

        log::debug!("executing code {script:?}");
        let executed = self.engine.execute(script, &self.config.source_label);
        self.drain_engine_logs();

        let outcome = match executed {
            Ok(true) => RunOutcome::Succeeded,
            Ok(false) => self.report_failure(),
            Err(fault) => return self.record_fault(fault),
        };

        let nodes = self.engine.nodes_with_attribute(PROPERTY_ATTRIBUTE);
        self.drain_engine_logs();
        let nodes = match nodes {
            Ok(nodes) => nodes,
            Err(fault) => return self.record_fault(fault),
        };

        self.properties = collect(nodes);
        log::info!("{} properties produced!", self.properties.len());
        self.schema = project(&self.properties);

        self.state = outcome.into();
        outcome
    }

    /// Finish the current run as [`RunOutcome::ExceptionRaised`].
    ///
    /// Hosts that catch an engine panic call this to report it like any other fault.
    pub fn record_fault(&mut self, fault: EngineFault) -> RunOutcome {
        self.drain_engine_logs();
        log::error!("engine fault: {fault}");
        self.transcript.push(TranscriptRecord::Fault(fault.description));
        self.properties.clear();
        self.state = SessionState::ExceptionRaised;
        RunOutcome::ExceptionRaised
    }

    fn report_failure(&mut self) -> RunOutcome {
        let compile_errors = self.engine.compile_errors();
        if !compile_errors.is_empty() {
            for error in compile_errors {
                self.transcript.push(error);
            }
            return RunOutcome::CompileFailed;
        }

        if let Some(error) = self.engine.eval_error() {
            self.transcript.push(TranscriptRecord::EvalError(error.clone()));
            return RunOutcome::EvalFailed;
        }

        log::warn!("engine reported failure without diagnostics, treating the run as successful");
        RunOutcome::Succeeded
    }

    fn drain_engine_logs(&mut self) {
        let records = self.sink.drain();
        for record in &records {
            log::log!(target: ENGINE_LOG_TARGET, log::Level::from(record.level), "{}", record.message);
        }
        self.transcript.extend(records);
    }

    /// Rendered transcript of the last run, records terminated by [`crate::SENTINEL`].
    pub fn transcript(&self) -> String {
        self.transcript.render()
    }

    pub fn transcript_records(&self) -> &Transcript {
        &self.transcript
    }

    pub fn schema(&self) -> &SchemaDocument {
        &self.schema
    }

    pub fn schema_json(&self) -> Result<String, SessionError> {
        Ok(self.schema.to_json()?)
    }

    pub fn properties(&self) -> &[PropertyNode] {
        &self.properties
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn data(&self) -> &DataSource {
        &self.data
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
