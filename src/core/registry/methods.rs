use crate::core::kinds::{AspectKind, MethodIdentity, TypeKey};
use crate::core::marker::MarkerInstance;
use crate::core::registry::catalog::MarkerCatalog;
use std::collections::HashMap;
use std::sync::Arc;

/// One marker occurrence paired with an aspect kind it triggers.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAspect {
    pub marker: MarkerInstance,
    pub aspect: AspectKind,
}

/// The triggers of one intercepted method, in declaration order.
///
/// Built once while scanning and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRegistration {
    method: MethodIdentity,
    triggers: Vec<TriggeredAspect>,
}

impl MethodRegistration {
    pub fn method(&self) -> &MethodIdentity {
        &self.method
    }

    pub fn triggers(&self) -> &[TriggeredAspect] {
        &self.triggers
    }
}

/// Index from intercepted method to its triggers.
///
/// Populated during composition with [`MethodRegistry::scan`], then shared
/// read-only (usually behind an `Arc`) by every call.
pub struct MethodRegistry {
    catalog: Arc<MarkerCatalog>,
    registrations: HashMap<MethodIdentity, MethodRegistration>,
}

impl MethodRegistry {
    pub fn new(catalog: Arc<MarkerCatalog>) -> Self {
        Self {
            catalog,
            registrations: HashMap::new(),
        }
    }

    /// Records every method of `candidate` carrying at least one trigger.
    ///
    /// Returns how many methods were registered. Methods without a trigger
    /// are left out entirely.
    pub fn scan(&mut self, candidate: &TypeKey) -> usize {
        let mut registered = 0;

        for discovered in self.catalog.metadata().methods_of(candidate) {
            let triggers: Vec<TriggeredAspect> = discovered
                .markers
                .iter()
                .flat_map(|marker| {
                    self.catalog
                        .aspects_for(marker.kind())
                        .map(move |aspect| TriggeredAspect {
                            marker: marker.clone(),
                            aspect: aspect.clone(),
                        })
                })
                .collect();

            if triggers.is_empty() {
                continue;
            }

            log::debug!(
                "Registered {} with {} trigger(s)",
                discovered.method,
                triggers.len()
            );
            let registration = MethodRegistration {
                method: discovered.method.clone(),
                triggers,
            };
            if self
                .registrations
                .insert(discovered.method, registration)
                .is_some()
            {
                log::warn!("Type '{}' was scanned twice, replacing its registrations.", candidate);
            }
            registered += 1;
        }

        registered
    }

    /// Whether any method of `candidate` carries a registered marker kind.
    ///
    /// Does not touch the registry, so it can decide proxying up front.
    pub fn has_triggers(&self, candidate: &TypeKey) -> bool {
        self.catalog
            .metadata()
            .methods_of(candidate)
            .iter()
            .flat_map(|m| m.markers.iter())
            .any(|marker| self.catalog.is_trigger(marker.kind()))
    }

    /// The registration for `method`, or `None` when nothing applies.
    pub fn lookup(&self, method: &MethodIdentity) -> Option<&MethodRegistration> {
        self.registrations.get(method)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn catalog(&self) -> &Arc<MarkerCatalog> {
        &self.catalog
    }
}
