//! Scriptable operator for engine tests.

use noodles_core::error::{NoodlesError, Result};
use noodles_core::traits::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, Outputs, PullFuture,
};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// An operator whose pull result, delay and role are set by the test.
///
/// `execute` copies the `in` input to the `out` output, or emits the
/// configured value when `in` is absent.
pub struct StubOperator {
    id: OperatorId,
    role: OperatorRole,
    dirty: AtomicBool,
    inputs: Mutex<Inputs>,
    outputs: Mutex<Outputs>,
    result: Mutex<std::result::Result<Value, String>>,
    delay: Duration,
    pulls: AtomicUsize,
    executions: AtomicUsize,
}

impl StubOperator {
    /// Create a stub with the given role, returning `null` when pulled.
    pub fn new(id: impl Into<OperatorId>, role: OperatorRole) -> Self {
        Self {
            id: id.into(),
            role,
            dirty: AtomicBool::new(false),
            inputs: Mutex::new(Inputs::new()),
            outputs: Mutex::new(Outputs::new()),
            result: Mutex::new(Ok(Value::null())),
            delay: Duration::ZERO,
            pulls: AtomicUsize::new(0),
            executions: AtomicUsize::new(0),
        }
    }

    /// Shared transform stub.
    pub fn transform(id: impl Into<OperatorId>) -> Arc<Self> {
        Arc::new(Self::new(id, OperatorRole::Transform))
    }

    /// Shared viewer (sink) stub.
    pub fn sink(id: impl Into<OperatorId>) -> Arc<Self> {
        Arc::new(Self::new(id, OperatorRole::Viewer))
    }

    /// Return `value` from `pull`.
    pub fn with_value(self, value: impl Into<Value>) -> Self {
        *self.result.lock() = Ok(value.into());
        self
    }

    /// Fail every `pull` with `cause`.
    pub fn failing(self, cause: impl Into<String>) -> Self {
        *self.result.lock() = Err(cause.into());
        self
    }

    /// Sleep for `delay` inside every `pull`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Seed an input value.
    pub fn with_input(self, name: &str, value: impl Into<Value>) -> Self {
        self.inputs.lock().insert(name.to_string(), value.into());
        self
    }

    /// Start with the dirty flag set.
    pub fn dirty(self) -> Self {
        self.dirty.store(true, Ordering::SeqCst);
        self
    }

    /// Change the value returned by later pulls.
    pub fn set_value(&self, value: impl Into<Value>) {
        *self.result.lock() = Ok(value.into());
    }

    /// Number of completed or in-flight pulls.
    pub fn pull_count(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }

    /// Number of `execute` calls.
    pub fn execution_count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl Operator for StubOperator {
    fn id(&self) -> &OperatorId {
        &self.id
    }

    fn info(&self) -> OperatorInfo {
        OperatorInfo::new("StubOperator", self.role)
            .with_inputs(["in"])
            .with_outputs(["out"])
    }

    fn role(&self) -> OperatorRole {
        self.role
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::SeqCst);
    }

    fn input_value(&self, name: &str) -> Option<Value> {
        self.inputs.lock().get(name).cloned()
    }

    fn output_value(&self, name: &str) -> Option<Value> {
        self.outputs.lock().get(name).cloned()
    }

    fn set_output(&self, name: &str, value: Value) -> Result<()> {
        self.outputs.lock().insert(name.to_string(), value);
        Ok(())
    }

    fn read_inputs(&self) -> Inputs {
        self.inputs.lock().clone()
    }

    fn execute<'a>(&'a self, inputs: Inputs) -> ExecuteFuture<'a> {
        Box::pin(async move {
            self.executions.fetch_add(1, Ordering::SeqCst);
            let out = match inputs.get("in") {
                Some(v) => v.clone(),
                None => self
                    .result
                    .lock()
                    .clone()
                    .map_err(|cause| NoodlesError::execution(&self.id, cause))?,
            };
            Ok(Outputs::from([("out".to_string(), out)]))
        })
    }

    fn pull<'a>(&'a self) -> PullFuture<'a> {
        Box::pin(async move {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.set_dirty(false);
            let result = self.result.lock().clone();
            result.map_err(|cause| NoodlesError::execution(&self.id, cause))
        })
    }
}
