use crate::core::kinds::MethodIdentity;
use crate::core::pipeline::aspect::AspectContext;
use crate::core::pipeline::step::PipelineStep;
use futures::future::BoxFuture;
use std::marker::PhantomData;

/// The end of a chain: performs the real call.
///
/// It may be resumed any number of times, once per downstream `proceed`.
pub trait Continuation: Send + Sync {
    fn resume(&self) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Adapts a closure returning a boxed future into a [`Continuation`].
///
/// The closure may borrow from the caller's stack for `'a`.
pub struct Terminal<'a, F> {
    call: F,
    _borrow: PhantomData<&'a ()>,
}

impl<'a, F> Terminal<'a, F>
where
    F: Fn() -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync,
{
    pub fn new(call: F) -> Self {
        Self {
            call,
            _borrow: PhantomData,
        }
    }
}

impl<'a, F> Continuation for Terminal<'a, F>
where
    F: Fn() -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync,
{
    fn resume(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        (self.call)()
    }
}

/// The rest of the chain, as seen from one aspect.
///
/// `Next` is `Copy`: every call to [`Next::proceed`] re-runs the remaining
/// aspects and the terminal continuation from scratch.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    method: &'a MethodIdentity,
    remaining: &'a [PipelineStep],
    terminal: &'a dyn Continuation,
}

impl<'a> Next<'a> {
    /// Runs the next aspect, or the real call when no aspect is left.
    pub fn proceed(&self) -> BoxFuture<'a, anyhow::Result<()>> {
        match self.remaining.split_first() {
            Some((step, rest)) => {
                log::trace!("{}: entering aspect '{}'", self.method, step.aspect_kind());
                let next = Next {
                    remaining: rest,
                    ..*self
                };
                step.aspect()
                    .invoke(AspectContext::new(self.method, step.marker()), next)
            }
            None => {
                log::trace!("{}: reached terminal continuation", self.method);
                self.terminal.resume()
            }
        }
    }

    /// Number of aspects still ahead of the real call.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn method(&self) -> &'a MethodIdentity {
        self.method
    }
}

/// Runs an ordered list of steps around one terminal continuation.
///
/// Step `i` receives a [`Next`] pointing at step `i + 1`; the last step's
/// `Next` points at the terminal. For steps `[A1, A2, A3]` the nesting is
/// `A1 → A2 → A3 → call → A3 → A2 → A1`.
pub struct InvocationPipeline<'m, C> {
    method: &'m MethodIdentity,
    terminal: C,
}

impl<'m, C: Continuation> InvocationPipeline<'m, C> {
    pub fn new(method: &'m MethodIdentity, terminal: C) -> Self {
        Self { method, terminal }
    }

    /// Executes the chain. Failures propagate unchanged.
    pub async fn execute(&self, steps: &[PipelineStep]) -> anyhow::Result<()> {
        let head = Next {
            method: self.method,
            remaining: steps,
            terminal: &self.terminal,
        };
        head.proceed().await
    }
}
