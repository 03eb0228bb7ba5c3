//! The boundary between callers and the pipeline.
//!
//! [`weaver::Weaver`] composes the catalog and registry from
//! [`options::AspectOptions`], [`interceptor::Interceptor`] runs the pipeline
//! for one call, and [`proxy::Proxy`] is the forwarding helper contract
//! wrappers delegate to.

pub mod interceptor;
pub mod options;
pub mod proxy;
pub mod weaver;
