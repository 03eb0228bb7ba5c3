use crate::core::error::AspectError;
use crate::core::kinds::{AspectKind, MethodIdentity};
use crate::core::pipeline::chain::{Continuation, InvocationPipeline, Terminal};
use crate::core::pipeline::step::PipelineStepFactory;
use crate::core::telemetry::{InvocationOutcome, InvocationTrace, Telemetry};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Entry point for redirected calls.
///
/// A proxy hands every call to the interceptor together with a closure
/// performing the real call. The interceptor looks up the method's steps,
/// runs them around the closure, and hands back the real call's result.
#[derive(Clone)]
pub struct Interceptor {
    steps: PipelineStepFactory,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl Interceptor {
    pub fn new(steps: PipelineStepFactory) -> Self {
        Self {
            steps,
            telemetry: None,
        }
    }

    /// Records one [`InvocationTrace`] per intercepted call.
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn steps(&self) -> &PipelineStepFactory {
        &self.steps
    }

    /// Tells the telemetry sink to persist what it has buffered.
    pub fn flush(&self) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.flush();
        }
    }

    /// Intercepts a call that completes without a value.
    pub async fn intercept<F, Fut>(&self, method: &MethodIdentity, call: F) -> anyhow::Result<()>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<()>> + Send,
    {
        let started = Instant::now();
        let call = &call;
        let (aspects, result) = self
            .run(method, Terminal::new(move || Box::pin(call())))
            .await;

        self.record(method, aspects, started, &result);
        result
    }

    /// Intercepts a call producing a value.
    ///
    /// The terminal continuation stores the value in a slot owned by this
    /// call; when aspects re-run the call the last value wins. An aspect that
    /// never proceeds leaves the slot empty and the call fails with
    /// [`AspectError::MissingResult`].
    pub async fn intercept_returning<R, F, Fut>(
        &self,
        method: &MethodIdentity,
        call: F,
    ) -> anyhow::Result<R>
    where
        R: Send,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<R>> + Send,
    {
        let started = Instant::now();
        let slot = Mutex::new(None);
        let (aspects, result) = {
            let call = &call;
            let captured = &slot;
            self.run(
                method,
                Terminal::new(move || {
                    Box::pin(async move {
                        call().await.map(|value| {
                            *captured.lock() = Some(value);
                        })
                    })
                }),
            )
            .await
        };

        let result = result.and_then(|()| {
            slot.into_inner()
                .ok_or_else(|| AspectError::MissingResult(method.clone()).into())
        });
        self.record(method, aspects, started, &result);
        result
    }

    /// Synchronous calls are not intercepted; the real method runs directly.
    pub fn invoke_sync<R>(&self, method: &MethodIdentity, call: impl FnOnce() -> R) -> R {
        log::trace!("{}: synchronous call bypasses aspects", method);
        call()
    }

    /// Runs the pipeline and reports which aspects took part.
    ///
    /// A resolution failure runs nothing and reports no aspects.
    async fn run<C: Continuation>(
        &self,
        method: &MethodIdentity,
        terminal: C,
    ) -> (Vec<AspectKind>, anyhow::Result<()>) {
        let steps = match self.steps.steps_for(method) {
            Ok(steps) => steps,
            Err(err) => return (Vec::new(), Err(err.into())),
        };
        log::trace!("{}: running pipeline with {} step(s)", method, steps.len());

        let pipeline = InvocationPipeline::new(method, terminal);
        let result = pipeline.execute(&steps).await;
        let aspects = steps.iter().map(|s| s.aspect_kind().clone()).collect();
        (aspects, result)
    }

    /// Records the trace of one finished call, outcome as the caller sees it.
    fn record<R>(
        &self,
        method: &MethodIdentity,
        aspects: Vec<AspectKind>,
        started: Instant,
        result: &anyhow::Result<R>,
    ) {
        let Some(telemetry) = &self.telemetry else {
            return;
        };
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        telemetry.record(InvocationTrace {
            invocation_id: uuid::Uuid::new_v4(),
            timestamp,
            method: method.clone(),
            aspects,
            outcome: match result {
                Ok(_) => InvocationOutcome::Completed,
                Err(err) => InvocationOutcome::Failed(err.to_string()),
            },
            elapsed_micros: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        });
    }
}
