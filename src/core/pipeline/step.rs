use crate::core::error::AspectError;
use crate::core::kinds::{AspectKind, MethodIdentity};
use crate::core::marker::MarkerInstance;
use crate::core::pipeline::aspect::Aspect;
use crate::core::registry::methods::MethodRegistry;
use crate::core::resolver::AspectResolver;
use std::fmt;
use std::sync::Arc;

/// A resolved aspect paired with the marker that triggered it.
///
/// Steps are built fresh for every call and dropped with it.
#[derive(Clone)]
pub struct PipelineStep {
    aspect: Arc<dyn Aspect>,
    aspect_kind: AspectKind,
    marker: MarkerInstance,
}

impl PipelineStep {
    pub fn new(aspect: Arc<dyn Aspect>, aspect_kind: AspectKind, marker: MarkerInstance) -> Self {
        Self {
            aspect,
            aspect_kind,
            marker,
        }
    }

    pub fn aspect(&self) -> &dyn Aspect {
        &*self.aspect
    }

    pub fn aspect_kind(&self) -> &AspectKind {
        &self.aspect_kind
    }

    pub fn marker(&self) -> &MarkerInstance {
        &self.marker
    }

    /// The step without its instance, for comparing pipelines across calls.
    pub fn describe(&self) -> StepDescription {
        StepDescription {
            aspect: self.aspect_kind.clone(),
            marker: self.marker.clone(),
        }
    }
}

impl fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStep")
            .field("aspect_kind", &self.aspect_kind)
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepDescription {
    pub aspect: AspectKind,
    pub marker: MarkerInstance,
}

/// Turns a method into its ordered, ready-to-run steps.
#[derive(Clone)]
pub struct PipelineStepFactory {
    registry: Arc<MethodRegistry>,
    resolver: Arc<dyn AspectResolver>,
}

impl PipelineStepFactory {
    pub fn new(registry: Arc<MethodRegistry>, resolver: Arc<dyn AspectResolver>) -> Self {
        Self { registry, resolver }
    }

    /// Steps for `method`, in registration order.
    ///
    /// An unregistered method yields no steps. A registered aspect kind the
    /// resolver cannot produce is a configuration defect and fails the call.
    pub fn steps_for(&self, method: &MethodIdentity) -> Result<Vec<PipelineStep>, AspectError> {
        let Some(registration) = self.registry.lookup(method) else {
            return Ok(Vec::new());
        };

        registration
            .triggers()
            .iter()
            .map(|trigger| -> Result<PipelineStep, AspectError> {
                let aspect = self.resolver.resolve(&trigger.aspect).ok_or_else(|| {
                    log::error!(
                        "Aspect '{}' is registered for {} but cannot be resolved",
                        trigger.aspect,
                        method
                    );
                    AspectError::AspectResolutionFailure {
                        kind: trigger.aspect.clone(),
                        method: method.clone(),
                    }
                })?;
                Ok(PipelineStep::new(
                    aspect,
                    trigger.aspect.clone(),
                    trigger.marker.clone(),
                ))
            })
            .collect()
    }

    pub fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    pub fn resolver(&self) -> &Arc<dyn AspectResolver> {
        &self.resolver
    }
}
