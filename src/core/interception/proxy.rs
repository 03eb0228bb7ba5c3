use crate::core::interception::interceptor::Interceptor;
use crate::core::kinds::{MethodIdentity, TypeKey};
use std::future::Future;

/// Forwarding helper for hand-written contract wrappers.
///
/// A wrapper owns a `Proxy` around the real implementation and implements
/// the contract trait by routing every method through [`Proxy::call`] or
/// [`Proxy::call_returning`]:
///
/// ```rust,ignore
/// struct GreeterProxy(Proxy<Greeter>);
///
/// #[async_trait]
/// impl Greet for GreeterProxy {
///     async fn greet(&self, name: String) -> anyhow::Result<String> {
///         self.0
///             .call_returning("greet", |greeter| greeter.greet(name.clone()))
///             .await
///     }
/// }
/// ```
pub struct Proxy<T> {
    target: T,
    interceptor: Interceptor,
    declaring_type: TypeKey,
}

impl<T: Send + Sync + 'static> Proxy<T> {
    /// Methods are identified against `T`'s own [`TypeKey`].
    pub fn new(target: T, interceptor: Interceptor) -> Self {
        Self {
            target,
            interceptor,
            declaring_type: TypeKey::of::<T>(),
        }
    }

    /// Identifies methods against `declaring_type` instead of `T`.
    pub fn with_type_key(mut self, declaring_type: impl Into<TypeKey>) -> Self {
        self.declaring_type = declaring_type.into();
        self
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn declaring_type(&self) -> &TypeKey {
        &self.declaring_type
    }

    pub fn method(&self, name: &'static str) -> MethodIdentity {
        MethodIdentity::new(self.declaring_type.clone(), name)
    }

    /// Forwards a call completing without a value.
    pub async fn call<'s, F, Fut>(&'s self, name: &'static str, call: F) -> anyhow::Result<()>
    where
        F: Fn(&'s T) -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<()>> + Send + 's,
    {
        let target = &self.target;
        self.interceptor
            .intercept(&self.method(name), || call(target))
            .await
    }

    /// Forwards a call producing a value.
    pub async fn call_returning<'s, R, F, Fut>(
        &'s self,
        name: &'static str,
        call: F,
    ) -> anyhow::Result<R>
    where
        R: Send,
        F: Fn(&'s T) -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<R>> + Send + 's,
    {
        let target = &self.target;
        self.interceptor
            .intercept_returning(&self.method(name), || call(target))
            .await
    }

    /// Forwards a synchronous call, which runs without aspects.
    pub fn call_sync<R>(&self, name: &'static str, call: impl FnOnce(&T) -> R) -> R {
        let target = &self.target;
        self.interceptor
            .invoke_sync(&self.method(name), || call(target))
    }
}
