use crate::core::error::AspectError;
use crate::core::kinds::{AspectKind, MarkerKind};
use crate::core::marker::Marker;
use crate::core::metadata::TypeMetadata;
use crate::core::pipeline::aspect::Aspect;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// "Markers of this kind trigger this aspect."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerMapping {
    pub marker: MarkerKind,
    pub aspect: AspectKind,
}

/// Append-only table of trigger mappings.
///
/// Every mapping is validated before it is admitted, so a failed
/// registration leaves the catalog exactly as it was. Duplicates are kept:
/// when one marker kind maps to several aspect kinds, all of them fire, in
/// registration order.
pub struct MarkerCatalog {
    metadata: Arc<dyn TypeMetadata>,
    mappings: Vec<TriggerMapping>,
}

impl MarkerCatalog {
    pub fn new(metadata: Arc<dyn TypeMetadata>) -> Self {
        Self {
            metadata,
            mappings: Vec::new(),
        }
    }

    /// Registers a mapping after checking both capabilities.
    pub fn register(
        &mut self,
        marker: impl Into<MarkerKind>,
        aspect: impl Into<AspectKind>,
    ) -> Result<(), AspectError> {
        let marker = marker.into();
        let aspect = aspect.into();

        if !self.metadata.is_marker_kind(&marker) {
            return Err(AspectError::InvalidMarkerKind(marker));
        }
        if !self.metadata.is_aspect_kind(&aspect) {
            return Err(AspectError::InvalidAspectKind(aspect));
        }

        self.admit(TriggerMapping { marker, aspect });
        Ok(())
    }

    /// Registers a mapping between two Rust types.
    ///
    /// The trait bounds already prove both capabilities.
    pub fn register_types<M: Marker, A: Aspect>(&mut self) {
        self.admit(TriggerMapping {
            marker: M::kind(),
            aspect: AspectKind::of::<A>(),
        });
    }

    pub(crate) fn admit(&mut self, mapping: TriggerMapping) {
        if self.mappings.iter().any(|m| m.marker == mapping.marker) {
            log::warn!(
                "Marker kind '{}' is already mapped; '{}' will fire alongside the earlier aspects.",
                mapping.marker,
                mapping.aspect
            );
        }
        log::debug!("Registered trigger '{}' -> '{}'", mapping.marker, mapping.aspect);
        self.mappings.push(mapping);
    }

    pub fn mappings(&self) -> &[TriggerMapping] {
        &self.mappings
    }

    /// Registered marker kinds, in registration order.
    pub fn marker_kinds(&self) -> impl Iterator<Item = &MarkerKind> {
        self.mappings.iter().map(|m| &m.marker)
    }

    /// Registered aspect kinds, in registration order.
    pub fn aspect_kinds(&self) -> impl Iterator<Item = &AspectKind> {
        self.mappings.iter().map(|m| &m.aspect)
    }

    /// Aspect kinds triggered by `marker`, in registration order.
    pub fn aspects_for<'a>(&'a self, marker: &'a MarkerKind) -> impl Iterator<Item = &'a AspectKind> {
        self.mappings
            .iter()
            .filter(move |m| &m.marker == marker)
            .map(|m| &m.aspect)
    }

    pub fn is_trigger(&self, marker: &MarkerKind) -> bool {
        self.mappings.iter().any(|m| &m.marker == marker)
    }

    pub fn metadata(&self) -> &Arc<dyn TypeMetadata> {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::StaticMetadata;
    use crate::core::pipeline::aspect::AspectContext;
    use crate::core::pipeline::chain::Next;
    use async_trait::async_trait;

    #[derive(Serialize, Deserialize)]
    struct Trigger;

    impl Marker for Trigger {
        const KIND: &'static str = "trigger";
    }

    struct StubAspect;

    #[async_trait]
    impl Aspect for StubAspect {
        async fn invoke(&self, _context: AspectContext<'_>, next: Next<'_>) -> anyhow::Result<()> {
            next.proceed().await
        }
    }

    fn catalog() -> MarkerCatalog {
        let metadata = StaticMetadata::new()
            .with_marker::<Trigger>()
            .with_marker_kind("another")
            .with_aspect::<StubAspect>()
            .with_aspect_kind("OtherAspect");
        MarkerCatalog::new(Arc::new(metadata))
    }

    #[test]
    fn test_empty_catalog() {
        let sut = catalog();
        assert_eq!(sut.marker_kinds().count(), 0);
        assert_eq!(sut.aspect_kinds().count(), 0);
    }

    #[test]
    fn test_register_single() {
        let mut sut = catalog();
        sut.register("trigger", AspectKind::of::<StubAspect>()).unwrap();

        assert_eq!(sut.marker_kinds().collect::<Vec<_>>(), vec![&MarkerKind::from("trigger")]);
        assert_eq!(sut.aspect_kinds().collect::<Vec<_>>(), vec![&AspectKind::of::<StubAspect>()]);
    }

    #[test]
    fn test_register_multiple_keeps_order() {
        let mut sut = catalog();
        sut.register("trigger", AspectKind::of::<StubAspect>()).unwrap();
        sut.register("another", "OtherAspect").unwrap();

        assert_eq!(
            sut.marker_kinds().collect::<Vec<_>>(),
            vec![&MarkerKind::from("trigger"), &MarkerKind::from("another")]
        );
    }

    #[test]
    fn test_invalid_marker_kind_leaves_catalog_untouched() {
        let mut sut = catalog();
        sut.register("trigger", "OtherAspect").unwrap();

        let err = sut.register("not-a-marker", "OtherAspect").unwrap_err();
        assert!(matches!(err, AspectError::InvalidMarkerKind(ref k) if k.as_str() == "not-a-marker"));
        assert_eq!(sut.mappings().len(), 1);
    }

    #[test]
    fn test_invalid_aspect_kind_leaves_catalog_untouched() {
        let mut sut = catalog();

        let err = sut.register("trigger", "NotAnAspect").unwrap_err();
        assert!(matches!(err, AspectError::InvalidAspectKind(ref k) if k.as_str() == "NotAnAspect"));
        assert!(sut.mappings().is_empty());
    }

    #[test]
    fn test_marker_kind_is_checked_before_aspect_kind() {
        let mut sut = catalog();
        let err = sut.register("nope", "NotAnAspect").unwrap_err();
        assert!(matches!(err, AspectError::InvalidMarkerKind(_)));
    }

    #[test]
    fn test_same_marker_may_map_to_several_aspects() {
        let mut sut = catalog();
        sut.register("trigger", AspectKind::of::<StubAspect>()).unwrap();
        sut.register("trigger", "OtherAspect").unwrap();

        let trigger = MarkerKind::from("trigger");
        assert_eq!(
            sut.aspects_for(&trigger).collect::<Vec<_>>(),
            vec![&AspectKind::of::<StubAspect>(), &AspectKind::from("OtherAspect")]
        );
    }

    #[test]
    fn test_same_aspect_may_serve_several_markers() {
        let mut sut = catalog();
        sut.register("trigger", "OtherAspect").unwrap();
        sut.register("another", "OtherAspect").unwrap();

        assert!(sut.is_trigger(&MarkerKind::from("trigger")));
        assert!(sut.is_trigger(&MarkerKind::from("another")));
        assert_eq!(sut.mappings().len(), 2);
    }

    #[test]
    fn test_register_types() {
        let mut sut = MarkerCatalog::new(Arc::new(StaticMetadata::new()));
        sut.register_types::<Trigger, StubAspect>();

        assert_eq!(
            sut.mappings(),
            &[TriggerMapping {
                marker: MarkerKind::from("trigger"),
                aspect: AspectKind::of::<StubAspect>(),
            }]
        );
    }
}
