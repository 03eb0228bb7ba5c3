use crate::core::kinds::{AspectKind, MethodIdentity};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an intercepted call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum InvocationOutcome {
    Completed,
    Failed(String),
}

/// A single entry in the invocation trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationTrace {
    pub invocation_id: Uuid,
    pub timestamp: u64,
    pub method: MethodIdentity,
    pub aspects: Vec<AspectKind>,
    pub outcome: InvocationOutcome,
    pub elapsed_micros: u64,
}

/// Trait for recording invocation traces.
pub trait Telemetry: Send + Sync {
    fn record(&self, entry: InvocationTrace);
    /// Called through `Weaver::flush` when the host shuts down.
    fn flush(&self);
}

/// Simple in-memory collector for traces.
#[derive(Default)]
pub struct MemoryTelemetry {
    traces: Mutex<Vec<InvocationTrace>>,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_traces(&self) -> Vec<InvocationTrace> {
        self.traces.lock().clone()
    }
}

impl Telemetry for MemoryTelemetry {
    fn record(&self, entry: InvocationTrace) {
        self.traces.lock().push(entry);
    }

    fn flush(&self) {
        // No-op for memory collector
    }
}
