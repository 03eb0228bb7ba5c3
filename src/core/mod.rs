pub mod builtin;
pub mod error;
pub mod interception;
pub mod kinds;
pub mod marker;
pub mod metadata;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod telemetry;
pub mod validation;
