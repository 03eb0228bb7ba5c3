//! Resolution of aspect instances.
//!
//! The pipeline never builds aspects itself; it asks an [`AspectResolver`]
//! once per step per call. [`AspectContainer`] is a small ready-made resolver
//! with transient and singleton lifetimes.

use crate::core::kinds::AspectKind;
use crate::core::pipeline::aspect::Aspect;
use std::collections::HashMap;
use std::sync::Arc;

/// Produces aspect instances on demand.
pub trait AspectResolver: Send + Sync {
    /// Returns one instance for `kind`, or `None` if nothing is configured.
    fn resolve(&self, kind: &AspectKind) -> Option<Arc<dyn Aspect>>;

    /// Whether `kind` can be resolved. Used for pre-flight validation.
    fn can_resolve(&self, kind: &AspectKind) -> bool {
        self.resolve(kind).is_some()
    }
}

type AspectFactory = Box<dyn Fn() -> Arc<dyn Aspect> + Send + Sync>;

/// How long a resolved instance lives.
pub enum Lifetime {
    /// A fresh instance per resolution.
    Transient(AspectFactory),
    /// One instance shared by every resolution.
    Singleton(Arc<dyn Aspect>),
}

/// A resolver backed by a table of aspect kinds.
#[derive(Default)]
pub struct AspectContainer {
    entries: HashMap<AspectKind, Lifetime>,
}

impl AspectContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `A` as transient, keyed by its type.
    pub fn transient<A, F>(self, factory: F) -> Self
    where
        A: Aspect,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.transient_kind(AspectKind::of::<A>(), move || Arc::new(factory()) as Arc<dyn Aspect>)
    }

    /// Registers a transient factory under an explicit kind.
    pub fn transient_kind<F>(self, kind: impl Into<AspectKind>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Aspect> + Send + Sync + 'static,
    {
        self.insert(kind.into(), Lifetime::Transient(Box::new(factory)))
    }

    /// Registers a shared instance of `A`, keyed by its type.
    pub fn singleton<A: Aspect>(self, instance: A) -> Self {
        self.singleton_kind(AspectKind::of::<A>(), Arc::new(instance))
    }

    /// Registers a shared instance under an explicit kind.
    pub fn singleton_kind(self, kind: impl Into<AspectKind>, instance: Arc<dyn Aspect>) -> Self {
        self.insert(kind.into(), Lifetime::Singleton(instance))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &AspectKind> {
        self.entries.keys()
    }

    fn insert(mut self, kind: AspectKind, lifetime: Lifetime) -> Self {
        if self.entries.contains_key(&kind) {
            log::warn!(
                "Aspect kind '{}' was already registered, overwriting it.",
                kind
            );
        }
        self.entries.insert(kind, lifetime);
        self
    }
}

impl AspectResolver for AspectContainer {
    fn resolve(&self, kind: &AspectKind) -> Option<Arc<dyn Aspect>> {
        match self.entries.get(kind)? {
            Lifetime::Transient(factory) => Some(factory()),
            Lifetime::Singleton(instance) => Some(instance.clone()),
        }
    }

    fn can_resolve(&self, kind: &AspectKind) -> bool {
        self.entries.contains_key(kind)
    }
}
