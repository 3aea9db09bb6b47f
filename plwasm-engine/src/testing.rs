//! A programmable [`PatternEngine`] for tests and for prototyping hosts without a real engine.
//!
//! Every script text is mapped to a [`Scenario`] describing what "evaluating" it does.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::{
    CompileError, DangerousCall, DangerousCallHandler, DataSource, EngineFault, EvalError, LogLevel,
    LogSink, Node, PatternEngine,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Success,
    /// Report failure without any diagnostic attached.
    SilentFailure,
    CompileErrors(Vec<CompileError>),
    EvalError(EvalError),
    /// `execute` itself fails.
    Fault(String),
    /// `execute` succeeds but enumerating the produced nodes fails.
    CollectionFault(String),
    /// The engine panics while executing.
    Panic(String),
}

/// What one script does when executed.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    logs: Vec<(LogLevel, String)>,
    reads: Vec<(u64, usize)>,
    dangerous_calls: Vec<String>,
    nodes: Vec<Node>,
    outcome: Outcome,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(mut self, level: LogLevel, message: impl Into<String>) -> Self {
        self.logs.push((level, message.into()));
        self
    }

    /// Read `size` bytes at `address` and log them as hex.
    pub fn read(mut self, address: u64, size: usize) -> Self {
        self.reads.push((address, size));
        self
    }

    pub fn dangerous_call(mut self, function: impl Into<String>) -> Self {
        self.dangerous_calls.push(function.into());
        self
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }
}

#[derive(Default)]
pub struct ScriptedEngine {
    scenarios: HashMap<String, Scenario>,
    data: DataSource,
    sink: LogSink,
    dangerous_call_handler: Option<DangerousCallHandler>,
    include_paths: Vec<PathBuf>,

    compile_errors: Vec<CompileError>,
    eval_error: Option<EvalError>,
    nodes: Vec<Node>,
    collection_fault: Option<String>,
    executions: usize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scenario(mut self, source: impl Into<String>, scenario: Scenario) -> Self {
        self.register(source, scenario);
        self
    }

    pub fn register(&mut self, source: impl Into<String>, scenario: Scenario) {
        self.scenarios.insert(source.into(), scenario);
    }

    pub fn data(&self) -> &DataSource {
        &self.data
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn has_dangerous_call_handler(&self) -> bool {
        self.dangerous_call_handler.is_some()
    }

    /// How many times `execute` ran.
    pub fn executions(&self) -> usize {
        self.executions
    }

    fn reset(&mut self) {
        self.compile_errors.clear();
        self.eval_error = None;
        self.nodes.clear();
        self.collection_fault = None;
    }

    fn permit(&mut self, function: &str) -> bool {
        let call = DangerousCall { function: function.to_string() };
        // Without a policy nothing dangerous runs.
        match self.dangerous_call_handler.as_mut() {
            Some(handler) => handler(&call),
            None => false,
        }
    }
}

impl PatternEngine for ScriptedEngine {
    fn set_data_source(&mut self, source: DataSource) {
        self.data = source;
    }

    fn set_log_sink(&mut self, sink: LogSink) {
        self.sink = sink;
    }

    fn set_dangerous_call_handler(&mut self, handler: DangerousCallHandler) {
        self.dangerous_call_handler = Some(handler);
    }

    fn set_include_paths(&mut self, paths: Vec<PathBuf>) {
        self.include_paths = paths;
    }

    fn execute(&mut self, source: &str, source_label: &str) -> Result<bool, EngineFault> {
        self.reset();
        self.executions += 1;

        let Some(scenario) = self.scenarios.get(source).cloned() else {
            self.compile_errors
                .push(CompileError::new("unknown script").at(source_label, 1, 1));
            return Ok(false);
        };

        for (level, message) in &scenario.logs {
            self.sink.log(*level, message.clone());
        }

        for &(address, size) in &scenario.reads {
            let mut buf = vec![0u8; size];
            if self.data.try_read(address, &mut buf).is_none() {
                self.eval_error = Some(EvalError::new(
                    1,
                    1,
                    format!("address 0x{address:X} out of range (data size 0x{:X})", self.data.len()),
                ));
                return Ok(false);
            }
            let hex: Vec<String> = buf.iter().map(|b| format!("{b:02X}")).collect();
            self.sink.debug(format!("0x{address:08X}: {}", hex.join(" ")));
        }

        for function in &scenario.dangerous_calls {
            if !self.permit(function) {
                self.sink.error(format!("call to dangerous function '{function}' was denied"));
                self.eval_error = Some(EvalError::new(1, 1, "dangerous function call denied"));
                return Ok(false);
            }
        }

        self.nodes = scenario.nodes;

        match scenario.outcome {
            Outcome::Success => Ok(true),
            Outcome::SilentFailure => Ok(false),
            Outcome::CompileErrors(errors) => {
                self.compile_errors = errors;
                Ok(false)
            }
            Outcome::EvalError(error) => {
                self.eval_error = Some(error);
                Ok(false)
            }
            Outcome::Fault(description) => Err(EngineFault::new(description)),
            Outcome::CollectionFault(description) => {
                self.collection_fault = Some(description);
                Ok(true)
            }
            Outcome::Panic(message) => panic!("{message}"),
        }
    }

    fn compile_errors(&self) -> &[CompileError] {
        &self.compile_errors
    }

    fn eval_error(&self) -> Option<&EvalError> {
        self.eval_error.as_ref()
    }

    fn nodes_with_attribute(&self, name: &str) -> Result<Vec<Node>, EngineFault> {
        if let Some(description) = &self.collection_fault {
            return Err(EngineFault::new(description.clone()));
        }
        Ok(self.nodes.iter().filter(|n| n.has_attribute(name)).cloned().collect())
    }
}
