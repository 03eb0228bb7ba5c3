//! Build-time side of the engine.
//!
//! - [`MarkerCatalog`](catalog::MarkerCatalog) records which marker kinds trigger which aspect kinds
//! - [`MethodRegistry`](methods::MethodRegistry) records which methods carry which triggers

pub mod catalog;
pub mod methods;
