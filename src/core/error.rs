use crate::core::kinds::{AspectKind, MarkerKind, MethodIdentity};
use thiserror::Error;

/// Errors raised by the aspect machinery itself.
///
/// Failures of the real method or of aspect code are not wrapped in this
/// type; they reach the caller as the original [`anyhow::Error`].
#[derive(Debug, Error)]
pub enum AspectError {
    #[error("Invalid marker kind: '{0}' is not a marker type")]
    InvalidMarkerKind(MarkerKind),

    #[error("Invalid aspect kind: '{0}' does not implement the aspect capability")]
    InvalidAspectKind(AspectKind),

    #[error("Aspect resolution failure: no instance of '{kind}' could be resolved for {method}")]
    AspectResolutionFailure {
        kind: AspectKind,
        method: MethodIdentity,
    },

    #[error("Missing result: {0} completed without producing a value")]
    MissingResult(MethodIdentity),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
