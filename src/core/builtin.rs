//! Ready-made markers and the aspects they trigger.
//!
//! Neither is registered automatically; map them like any other pair:
//!
//! ```rust,ignore
//! let options = AspectOptions::new()
//!     .register::<Logged, LoggingAspect>()
//!     .register::<Retry, RetryAspect>();
//! ```

use crate::core::marker::Marker;
use crate::core::pipeline::aspect::{Aspect, AspectContext};
use crate::core::pipeline::chain::Next;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Logs entry and exit of the marked method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logged {
    /// A `log::Level` name; `info` when absent or unrecognised.
    #[serde(default)]
    pub level: Option<String>,
}

impl Marker for Logged {
    const KIND: &'static str = "logged";
}

impl Logged {
    pub fn at(level: log::Level) -> Self {
        Self {
            level: Some(level.as_str().to_string()),
        }
    }

    pub fn level(&self) -> log::Level {
        self.level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(log::Level::Info)
    }
}

#[derive(Debug, Default)]
pub struct LoggingAspect;

#[async_trait]
impl Aspect for LoggingAspect {
    async fn invoke(&self, context: AspectContext<'_>, next: Next<'_>) -> anyhow::Result<()> {
        let level = context
            .decode_marker::<Logged>()
            .unwrap_or_default()
            .level();
        let method = context.method();

        log::log!(level, "--> {}", method);
        let started = Instant::now();
        let result = next.proceed().await;

        match &result {
            Ok(()) => log::log!(level, "<-- {} ({:?})", method, started.elapsed()),
            Err(err) => log::warn!("<-- {} failed after {:?}: {}", method, started.elapsed(), err),
        }
        result
    }
}

/// Re-runs the rest of the chain until it succeeds or attempts run out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retry {
    /// Total attempts, the first one included.
    pub attempts: u32,
    /// Delay before the first retry; doubles on every further retry.
    #[serde(default)]
    pub backoff_ms: u64,
}

impl Marker for Retry {
    const KIND: &'static str = "retry";
}

impl Retry {
    /// Delay after the failed attempt `attempt` (0-indexed).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

#[derive(Debug, Default)]
pub struct RetryAspect;

#[async_trait]
impl Aspect for RetryAspect {
    async fn invoke(&self, context: AspectContext<'_>, next: Next<'_>) -> anyhow::Result<()> {
        let policy: Retry = context
            .decode_marker()
            .with_context(|| format!("Invalid retry marker on {}", context.method()))?;
        let attempts = policy.attempts.max(1);

        let mut attempt = 0;
        loop {
            match next.proceed().await {
                Ok(()) => return Ok(()),
                Err(err) if attempt + 1 < attempts => {
                    let backoff = policy.backoff_for_attempt(attempt);
                    log::warn!(
                        "{} failed on attempt {}/{}: {}. Retrying in {:?}",
                        context.method(),
                        attempt + 1,
                        attempts,
                        err,
                        backoff
                    );
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    log::error!("{} failed after {} attempt(s)", context.method(), attempts);
                    return Err(err);
                }
            }
        }
    }
}
