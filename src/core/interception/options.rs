use crate::core::error::AspectError;
use crate::core::kinds::{AspectKind, MarkerKind};
use crate::core::marker::Marker;
use crate::core::pipeline::aspect::Aspect;
use crate::core::registry::catalog::{MarkerCatalog, TriggerMapping};
use serde::Deserialize;

#[derive(Debug, Clone)]
struct PendingTrigger {
    mapping: TriggerMapping,
    /// Registered through Rust types, so already known to be valid.
    proven: bool,
}

#[derive(Deserialize)]
struct OptionsDocument {
    #[serde(default)]
    triggers: Vec<TriggerMapping>,
}

/// Ordered trigger registrations collected before composition.
///
/// ```rust,ignore
/// let options = AspectOptions::new()
///     .register::<Logged, LoggingAspect>()
///     .register_kinds("audit", "AuditAspect");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AspectOptions {
    triggers: Vec<PendingTrigger>,
}

impl AspectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping between a marker type and an aspect type.
    pub fn register<M: Marker, A: Aspect>(mut self) -> Self {
        self.triggers.push(PendingTrigger {
            mapping: TriggerMapping {
                marker: M::kind(),
                aspect: AspectKind::of::<A>(),
            },
            proven: true,
        });
        self
    }

    /// Adds a mapping by name. Checked against type metadata on apply.
    pub fn register_kinds(
        mut self,
        marker: impl Into<MarkerKind>,
        aspect: impl Into<AspectKind>,
    ) -> Self {
        self.triggers.push(PendingTrigger {
            mapping: TriggerMapping {
                marker: marker.into(),
                aspect: aspect.into(),
            },
            proven: false,
        });
        self
    }

    /// Loads by-name mappings from a JSON document:
    ///
    /// ```json
    /// { "triggers": [ { "marker": "logged", "aspect": "LoggingAspect" } ] }
    /// ```
    pub fn from_json(document: &str) -> Result<Self, AspectError> {
        let parsed: OptionsDocument = serde_json::from_str(document)?;
        log::debug!("Loaded {} trigger(s) from configuration", parsed.triggers.len());

        Ok(parsed
            .triggers
            .into_iter()
            .fold(Self::new(), |options, mapping| {
                options.register_kinds(mapping.marker, mapping.aspect)
            }))
    }

    /// Appends another set of options after these.
    pub fn merge(mut self, other: AspectOptions) -> Self {
        self.triggers.extend(other.triggers);
        self
    }

    pub fn mappings(&self) -> impl Iterator<Item = &TriggerMapping> {
        self.triggers.iter().map(|t| &t.mapping)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Registers every mapping into `catalog`, in order.
    ///
    /// All by-name mappings are checked first; on the first invalid one the
    /// catalog is left untouched.
    pub fn apply(&self, catalog: &mut MarkerCatalog) -> Result<(), AspectError> {
        let metadata = catalog.metadata().clone();
        for pending in self.triggers.iter().filter(|t| !t.proven) {
            let TriggerMapping { marker, aspect } = &pending.mapping;
            if !metadata.is_marker_kind(marker) {
                return Err(AspectError::InvalidMarkerKind(marker.clone()));
            }
            if !metadata.is_aspect_kind(aspect) {
                return Err(AspectError::InvalidAspectKind(aspect.clone()));
            }
        }

        for pending in &self.triggers {
            catalog.admit(pending.mapping.clone());
        }
        Ok(())
    }
}
