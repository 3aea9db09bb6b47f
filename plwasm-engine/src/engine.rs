use std::path::PathBuf;

use crate::{CompileError, DataSource, EngineFault, EvalError, LogSink, Node};

/// A host-level function a script asked to call that needs explicit permission
/// (file system access, process spawning and the like).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DangerousCall {
    pub function: String,
}

/// Decides whether a [`DangerousCall`] may proceed. Returning `false` refuses it.
pub type DangerousCallHandler = Box<dyn FnMut(&DangerousCall) -> bool>;

/// The runtime interface the host layer expects from a pattern evaluation engine.
///
/// Implement this on top of whatever parser/evaluator is embedded. The host drives one
/// execution at a time and never calls into the engine concurrently.
pub trait PatternEngine {
    /// Install the bytes scripts are evaluated against. Replaces any previous source.
    fn set_data_source(&mut self, source: DataSource);

    /// Register the sink diagnostics are written to. Called before every execution.
    fn set_log_sink(&mut self, sink: LogSink);

    /// Install the policy consulted before any dangerous function call.
    fn set_dangerous_call_handler(&mut self, handler: DangerousCallHandler);

    /// Directories searched when a script includes or imports other sources.
    fn set_include_paths(&mut self, paths: Vec<PathBuf>);

    /// Compile and evaluate `source`.
    ///
    /// `Ok(false)` means the script failed through the structured channels
    /// ([`PatternEngine::compile_errors`] / [`PatternEngine::eval_error`]).
    /// `Err` is reserved for failures of the engine itself.
    fn execute(&mut self, source: &str, source_label: &str) -> Result<bool, EngineFault>;

    /// Compile errors of the last execution.
    fn compile_errors(&self) -> &[CompileError];

    /// Evaluation error of the last execution.
    fn eval_error(&self) -> Option<&EvalError>;

    /// Every node produced by the last execution that carries attribute `name`, in
    /// evaluation order.
    fn nodes_with_attribute(&self, name: &str) -> Result<Vec<Node>, EngineFault>;
}

impl<E: PatternEngine + ?Sized> PatternEngine for Box<E> {
    fn set_data_source(&mut self, source: DataSource) {
        (**self).set_data_source(source)
    }

    fn set_log_sink(&mut self, sink: LogSink) {
        (**self).set_log_sink(sink)
    }

    fn set_dangerous_call_handler(&mut self, handler: DangerousCallHandler) {
        (**self).set_dangerous_call_handler(handler)
    }

    fn set_include_paths(&mut self, paths: Vec<PathBuf>) {
        (**self).set_include_paths(paths)
    }

    fn execute(&mut self, source: &str, source_label: &str) -> Result<bool, EngineFault> {
        (**self).execute(source, source_label)
    }

    fn compile_errors(&self) -> &[CompileError] {
        (**self).compile_errors()
    }

    fn eval_error(&self) -> Option<&EvalError> {
        (**self).eval_error()
    }

    fn nodes_with_attribute(&self, name: &str) -> Result<Vec<Node>, EngineFault> {
        (**self).nodes_with_attribute(name)
    }
}
