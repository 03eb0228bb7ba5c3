use crate::core::error::AspectError;
use crate::core::interception::interceptor::Interceptor;
use crate::core::interception::options::AspectOptions;
use crate::core::interception::proxy::Proxy;
use crate::core::kinds::{AspectKind, MarkerKind, TypeKey};
use crate::core::metadata::TypeMetadata;
use crate::core::pipeline::step::PipelineStepFactory;
use crate::core::registry::catalog::MarkerCatalog;
use crate::core::registry::methods::MethodRegistry;
use crate::core::resolver::AspectResolver;
use crate::core::telemetry::Telemetry;
use crate::core::validation::ValidationResult;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The composed aspect setup of one host.
///
/// Built once at startup with [`Weaver::compose`]; afterwards the catalog
/// and registry are frozen and the weaver only hands out interceptors and
/// proxies.
pub struct Weaver {
    registry: Arc<MethodRegistry>,
    interceptor: Interceptor,
    proxied: Vec<TypeKey>,
}

impl Weaver {
    /// Registers every mapping of `options`, scans the candidates that carry
    /// a registered marker and wires an interceptor over the result.
    ///
    /// Candidates without any trigger are left alone and will not be proxied.
    pub fn compose(
        options: &AspectOptions,
        metadata: Arc<dyn TypeMetadata>,
        resolver: Arc<dyn AspectResolver>,
        candidates: &[TypeKey],
    ) -> Result<Self, AspectError> {
        let mut catalog = MarkerCatalog::new(metadata);
        options.apply(&mut catalog)?;

        let mut registry = MethodRegistry::new(Arc::new(catalog));
        let mut proxied = Vec::new();
        for candidate in candidates {
            if proxied.contains(candidate) {
                log::debug!("Type '{}' is listed more than once, skipping repeat", candidate);
                continue;
            }
            if !registry.has_triggers(candidate) {
                log::trace!("Type '{}' has no triggers, not proxied", candidate);
                continue;
            }
            let methods = registry.scan(candidate);
            log::debug!("Type '{}' proxied with {} intercepted method(s)", candidate, methods);
            proxied.push(candidate.clone());
        }

        let registry = Arc::new(registry);
        let interceptor = Interceptor::new(PipelineStepFactory::new(registry.clone(), resolver));

        log::info!(
            "Composed {} trigger(s) over {} proxied type(s)",
            registry.catalog().mappings().len(),
            proxied.len()
        );

        Ok(Self {
            registry,
            interceptor,
            proxied,
        })
    }

    /// Records an [`InvocationTrace`](crate::InvocationTrace) for every call
    /// going through this weaver's proxies.
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.interceptor = self.interceptor.with_telemetry(telemetry);
        self
    }

    /// Flushes the telemetry sink, if any. Hosts call this on shutdown.
    pub fn flush(&self) {
        self.interceptor.flush();
    }

    /// Whether the host should register a proxy for `candidate`.
    pub fn needs_proxy(&self, candidate: &TypeKey) -> bool {
        self.proxied.contains(candidate)
    }

    pub fn proxied_types(&self) -> &[TypeKey] {
        &self.proxied
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Wraps `target`; methods are identified against `T`'s type.
    pub fn proxy<T: Send + Sync + 'static>(&self, target: T) -> Proxy<T> {
        Proxy::new(target, self.interceptor.clone())
    }

    /// Wraps `target`; methods are identified against `declaring_type`.
    pub fn proxy_as<T: Send + Sync + 'static>(
        &self,
        target: T,
        declaring_type: impl Into<TypeKey>,
    ) -> Proxy<T> {
        self.proxy(target).with_type_key(declaring_type)
    }

    pub fn catalog(&self) -> &MarkerCatalog {
        self.registry.catalog()
    }

    pub fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    /// Pre-flight check of the composed setup.
    ///
    /// Reports an error for every registered aspect kind the resolver cannot
    /// produce (each call reaching it would fail) and a warning for every
    /// marker kind mapped to more than one aspect kind.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        let catalog = self.catalog();
        let resolver = self.interceptor.steps().resolver();

        let mut checked: Vec<&AspectKind> = Vec::new();
        for aspect in catalog.aspect_kinds() {
            if checked.contains(&aspect) {
                continue;
            }
            checked.push(aspect);
            if !resolver.can_resolve(aspect) {
                result.add_error(format!(
                    "Aspect '{}' is registered but the resolver cannot produce it.",
                    aspect
                ));
            }
        }

        let mut fan_out: BTreeMap<&MarkerKind, Vec<&AspectKind>> = BTreeMap::new();
        for mapping in catalog.mappings() {
            let aspects = fan_out.entry(&mapping.marker).or_default();
            if !aspects.contains(&&mapping.aspect) {
                aspects.push(&mapping.aspect);
            }
        }
        for (marker, aspects) in fan_out.into_iter().filter(|(_, a)| a.len() > 1) {
            let names: Vec<&str> = aspects.iter().map(|a| a.as_str()).collect();
            result.add_warning(format!(
                "Marker '{}' triggers {} aspects ({}); all of them run, in registration order.",
                marker,
                names.len(),
                names.join(", ")
            ));
        }

        if self.proxied.is_empty() && !catalog.mappings().is_empty() {
            result.add_warning("Triggers are registered but no candidate type carries them.");
        }

        result
    }
}
