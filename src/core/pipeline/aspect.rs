use crate::core::kinds::{MarkerKind, MethodIdentity};
use crate::core::marker::MarkerInstance;
use crate::core::pipeline::chain::Next;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// What an aspect gets to see about the call it wraps.
#[derive(Debug, Clone, Copy)]
pub struct AspectContext<'a> {
    method: &'a MethodIdentity,
    marker: &'a MarkerInstance,
}

impl<'a> AspectContext<'a> {
    pub fn new(method: &'a MethodIdentity, marker: &'a MarkerInstance) -> Self {
        Self { method, marker }
    }

    /// The intercepted method.
    pub fn method(&self) -> &'a MethodIdentity {
        self.method
    }

    /// The marker occurrence that put this aspect in the chain.
    pub fn marker(&self) -> &'a MarkerInstance {
        self.marker
    }

    pub fn marker_kind(&self) -> &'a MarkerKind {
        self.marker.kind()
    }

    /// Decodes the triggering marker's payload.
    pub fn decode_marker<M: DeserializeOwned>(&self) -> Result<M, serde_json::Error> {
        self.marker.decode()
    }
}

/// A unit of cross-cutting behavior wrapped around an intercepted call.
///
/// The aspect decides everything about the downstream chain through `next`:
/// - not calling [`Next::proceed`] suppresses the real call and every later aspect
/// - calling it more than once runs the rest of the chain again
/// - code before and after the call runs as pre-work and post-work
///
/// A failure returned by `next` skips whatever post-work follows a `?`.
/// Aspects that need cleanup on failure match on the result instead.
#[async_trait]
pub trait Aspect: Send + Sync + 'static {
    async fn invoke(&self, context: AspectContext<'_>, next: Next<'_>) -> anyhow::Result<()>;
}
