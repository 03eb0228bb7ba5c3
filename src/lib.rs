//! # Aspectly
//!
//! Marker-driven cross-cutting behaviour for async Rust services.
//!
//! Methods carry declarative markers; each registered marker kind triggers an
//! aspect that wraps the call. Aspects run as an ordered chain around the real
//! call and decide themselves whether, when and how often to proceed.
//!
//! ## Features
//!
//! - **Build once, call many**: the marker catalog and method registry are frozen at startup and shared read-only
//! - **Ordered chains**: aspects nest in marker declaration order, repeated markers included
//! - **Full control in aspects**: proceed once, several times, or not at all
//! - **Errors stay intact**: failures of the real call reach the caller unchanged
//! - **Pre-flight validation**: catch unresolvable aspects before the first call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aspectly::prelude::*;
//! use std::sync::Arc;
//!
//! // An aspect runs around every call carrying its marker.
//! struct Timed;
//!
//! #[async_trait]
//! impl Aspect for Timed {
//!     async fn invoke(&self, context: AspectContext<'_>, next: Next<'_>) -> anyhow::Result<()> {
//!         log::info!("entering {}", context.method());
//!         next.proceed().await
//!     }
//! }
//!
//! struct Orders;
//!
//! impl Orders {
//!     async fn place(&self, id: u32) -> anyhow::Result<u32> {
//!         Ok(id)
//!     }
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let metadata = StaticMetadata::new()
//!     .with_marker::<Logged>()
//!     .with_aspect::<Timed>()
//!     .with_method(TypeKey::of::<Orders>(), "place", vec![MarkerInstance::new(Logged::KIND)]);
//!
//! let options = AspectOptions::new().register::<Logged, Timed>();
//! let resolver = AspectContainer::new().transient(|| Timed);
//!
//! let weaver = Weaver::compose(
//!     &options,
//!     Arc::new(metadata),
//!     Arc::new(resolver),
//!     &[TypeKey::of::<Orders>()],
//! )?;
//! weaver.validate().print_summary();
//!
//! let orders = weaver.proxy(Orders);
//! let id = orders.call_returning("place", |orders| orders.place(7)).await?;
//! assert_eq!(id, 7);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - Build time: [`MarkerCatalog`], [`MethodRegistry`], [`AspectOptions`], [`Weaver`]
//! - Call time: [`Interceptor`], [`PipelineStepFactory`], [`InvocationPipeline`], [`Next`]
//! - Collaborators: [`TypeMetadata`] for marker discovery, [`AspectResolver`] for instances
//! - [`prelude`]: Commonly used types and traits (import with `use aspectly::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

mod core;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

// Identifiers and markers
pub use core::kinds::{AspectKind, MarkerKind, MethodIdentity, TypeKey};
pub use core::marker::{Marker, MarkerInstance, MarkerValue};

// Errors
pub use core::error::AspectError;

// Collaborators
pub use core::metadata::{DiscoveredMethod, StaticMetadata, TypeMetadata};
pub use core::resolver::{AspectContainer, AspectResolver, Lifetime};

// Build time
pub use core::registry::catalog::{MarkerCatalog, TriggerMapping};
pub use core::registry::methods::{MethodRegistration, MethodRegistry, TriggeredAspect};

// Call time
pub use core::pipeline::aspect::{Aspect, AspectContext};
pub use core::pipeline::chain::{Continuation, InvocationPipeline, Next, Terminal};
pub use core::pipeline::step::{PipelineStep, PipelineStepFactory, StepDescription};

// Composition and interception
pub use core::interception::interceptor::Interceptor;
pub use core::interception::options::AspectOptions;
pub use core::interception::proxy::Proxy;
pub use core::interception::weaver::Weaver;

// Built-in aspects
pub use core::builtin::{Logged, LoggingAspect, Retry, RetryAspect};

// Observability
pub use core::telemetry::{InvocationOutcome, InvocationTrace, MemoryTelemetry, Telemetry};
pub use core::validation::{ValidationIssue, ValidationResult};

// ============================================================================
// Prelude Module - Convenient Bulk Imports
// ============================================================================

/// The main prelude: everything needed to write aspects and compose a host.
///
/// # Example
/// ```rust
/// use aspectly::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        // Aspects
        Aspect,
        AspectContext,
        // Composition
        AspectContainer,
        AspectError,
        AspectKind,
        AspectOptions,
        AspectResolver,
        Interceptor,
        // Built-in
        Logged,
        LoggingAspect,
        // Markers
        Marker,
        MarkerInstance,
        MarkerKind,
        MethodIdentity,
        Next,
        Proxy,
        Retry,
        RetryAspect,
        StaticMetadata,
        TypeKey,
        TypeMetadata,
        Weaver,
    };
    pub use async_trait::async_trait;
}

// ============================================================================
// Re-export commonly used external types for convenience
// ============================================================================

pub use async_trait::async_trait;
pub use serde_json::Value as JsonValue;

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
