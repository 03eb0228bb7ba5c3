//! Call-time side of the engine.
//!
//! - [`Aspect`](aspect::Aspect) and [`AspectContext`](aspect::AspectContext) for writing aspects
//! - [`PipelineStepFactory`](step::PipelineStepFactory) for turning a method into ready-to-run steps
//! - [`InvocationPipeline`](chain::InvocationPipeline) and [`Next`](chain::Next) for running them

pub mod aspect;
pub mod chain;
pub mod step;
