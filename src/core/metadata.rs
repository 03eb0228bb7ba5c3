//! Static type metadata: which kinds are markers, which are aspects, and
//! which markers sit on which methods.
//!
//! Rust has no runtime reflection, so hosts describe their types through a
//! [`TypeMetadata`] implementation. [`StaticMetadata`] is the declarative one.

use crate::core::kinds::{AspectKind, MarkerKind, MethodIdentity, TypeKey};
use crate::core::marker::{Marker, MarkerInstance};
use crate::core::pipeline::aspect::Aspect;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// One method of a candidate type, with its markers in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredMethod {
    pub method: MethodIdentity,
    pub markers: Vec<MarkerInstance>,
}

/// Pure, deterministic queries over the static structure of host types.
pub trait TypeMetadata: Send + Sync {
    /// Whether `kind` names a marker type.
    fn is_marker_kind(&self, kind: &MarkerKind) -> bool;

    /// Whether `kind` names a type implementing [`Aspect`].
    fn is_aspect_kind(&self, kind: &AspectKind) -> bool;

    /// Every method of `candidate`, in declaration order. Unknown types have none.
    fn methods_of(&self, candidate: &TypeKey) -> Vec<DiscoveredMethod>;
}

/// A [`TypeMetadata`] declared up front by the host.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    marker_kinds: HashSet<MarkerKind>,
    aspect_kinds: HashSet<AspectKind>,
    types: HashMap<TypeKey, Vec<DiscoveredMethod>>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker_kind(mut self, kind: impl Into<MarkerKind>) -> Self {
        self.marker_kinds.insert(kind.into());
        self
    }

    pub fn with_marker<M: Marker>(self) -> Self {
        self.with_marker_kind(M::kind())
    }

    pub fn with_aspect_kind(mut self, kind: impl Into<AspectKind>) -> Self {
        self.aspect_kinds.insert(kind.into());
        self
    }

    pub fn with_aspect<A: Aspect>(self) -> Self {
        self.with_aspect_kind(AspectKind::of::<A>())
    }

    /// Declares a method on `declaring_type` with its markers, in order.
    ///
    /// Declaring the same method twice replaces the earlier markers.
    pub fn with_method(
        mut self,
        declaring_type: impl Into<TypeKey>,
        name: impl Into<Cow<'static, str>>,
        markers: Vec<MarkerInstance>,
    ) -> Self {
        let declaring_type = declaring_type.into();
        let method = MethodIdentity::new(declaring_type.clone(), name);
        let methods = self.types.entry(declaring_type).or_default();

        match methods.iter_mut().find(|m| m.method == method) {
            Some(existing) => {
                log::warn!("Method {} was already declared, replacing its markers.", method);
                existing.markers = markers;
            }
            None => methods.push(DiscoveredMethod { method, markers }),
        }
        self
    }

    /// Declares a type without any method, so it is known but inert.
    pub fn with_type(mut self, declaring_type: impl Into<TypeKey>) -> Self {
        self.types.entry(declaring_type.into()).or_default();
        self
    }
}

impl TypeMetadata for StaticMetadata {
    fn is_marker_kind(&self, kind: &MarkerKind) -> bool {
        self.marker_kinds.contains(kind)
    }

    fn is_aspect_kind(&self, kind: &AspectKind) -> bool {
        self.aspect_kinds.contains(kind)
    }

    fn methods_of(&self, candidate: &TypeKey) -> Vec<DiscoveredMethod> {
        self.types.get(candidate).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Audit;

    impl Marker for Audit {
        const KIND: &'static str = "audit";
    }

    #[test]
    fn test_capability_queries() {
        let metadata = StaticMetadata::new()
            .with_marker::<Audit>()
            .with_aspect_kind("AuditAspect");

        assert!(metadata.is_marker_kind(&MarkerKind::from("audit")));
        assert!(!metadata.is_marker_kind(&MarkerKind::from("AuditAspect")));
        assert!(metadata.is_aspect_kind(&AspectKind::from("AuditAspect")));
        assert!(!metadata.is_aspect_kind(&AspectKind::from("audit")));
    }

    #[test]
    fn test_methods_keep_declaration_order() {
        let metadata = StaticMetadata::new()
            .with_method("Foo", "first", vec![MarkerInstance::new("a"), MarkerInstance::new("b")])
            .with_method("Foo", "second", vec![]);

        let methods = metadata.methods_of(&TypeKey::from("Foo"));
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].method.name(), "first");
        assert_eq!(methods[0].markers[0].kind(), &MarkerKind::from("a"));
        assert_eq!(methods[0].markers[1].kind(), &MarkerKind::from("b"));
        assert_eq!(methods[1].method.name(), "second");
    }

    #[test]
    fn test_redeclared_method_replaces_markers() {
        let metadata = StaticMetadata::new()
            .with_method("Foo", "bar", vec![MarkerInstance::new("a")])
            .with_method("Foo", "bar", vec![MarkerInstance::new("b")]);

        let methods = metadata.methods_of(&TypeKey::from("Foo"));
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].markers, vec![MarkerInstance::new("b")]);
    }

    #[test]
    fn test_unknown_type_has_no_methods() {
        let metadata = StaticMetadata::new().with_type("Empty");
        assert!(metadata.methods_of(&TypeKey::from("Empty")).is_empty());
        assert!(metadata.methods_of(&TypeKey::from("Nowhere")).is_empty());
    }
}
