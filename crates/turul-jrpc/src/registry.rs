//! Method registry
//!
//! Registration happens on a [`RegistryBuilder`]; [`RegistryBuilder::build`]
//! freezes it into an immutable [`MethodRegistry`] that the engine only reads.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::RegistryError;
use crate::handler::MethodHandler;

/// Per-method registration options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodOptions {
    /// Run the handler but never render a response, even when an id is present
    pub suppress_response: bool,
}

impl MethodOptions {
    pub fn suppressed() -> Self {
        Self {
            suppress_response: true,
        }
    }
}

/// Immutable handler entry owned by the registry
#[derive(Clone)]
pub struct HandlerDescriptor {
    handler: Arc<dyn MethodHandler>,
    suppress_response: bool,
}

impl HandlerDescriptor {
    pub fn handler(&self) -> &Arc<dyn MethodHandler> {
        &self.handler
    }

    pub fn suppress_response(&self) -> bool {
        self.suppress_response
    }
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("suppress_response", &self.suppress_response)
            .finish_non_exhaustive()
    }
}

/// Read-only lookup table from fully-qualified method name to handler
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    handlers: HashMap<String, HandlerDescriptor>,
}

impl MethodRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Exact-match lookup
    pub fn lookup(&self, method: &str) -> Option<&HandlerDescriptor> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// All registered method names, sorted
    pub fn registered_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.handlers.keys().cloned().collect();
        methods.sort();
        methods
    }
}

/// Write-once construction phase of a [`MethodRegistry`]
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, HandlerDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `method`
    pub fn method<H>(
        &mut self,
        method: impl Into<String>,
        handler: H,
    ) -> Result<&mut Self, RegistryError>
    where
        H: MethodHandler + 'static,
    {
        self.method_with_options(method, handler, MethodOptions::default())
    }

    /// Register a handler with explicit options
    pub fn method_with_options<H>(
        &mut self,
        method: impl Into<String>,
        handler: H,
        options: MethodOptions,
    ) -> Result<&mut Self, RegistryError>
    where
        H: MethodHandler + 'static,
    {
        self.insert(method.into(), Arc::new(handler), options)?;
        Ok(self)
    }

    /// Start a method group; methods registered through it are named
    /// `prefix.method`.
    pub fn group(&mut self, prefix: impl Into<String>) -> MethodGroup<'_> {
        MethodGroup {
            builder: self,
            path: prefix.into(),
        }
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    pub fn build(self) -> MethodRegistry {
        debug!(methods = self.handlers.len(), "Method registry built");
        MethodRegistry {
            handlers: self.handlers,
        }
    }

    fn insert(
        &mut self,
        method: String,
        handler: Arc<dyn MethodHandler>,
        options: MethodOptions,
    ) -> Result<(), RegistryError> {
        if method.is_empty() {
            return Err(RegistryError::EmptyMethodName);
        }
        if self.handlers.contains_key(&method) {
            return Err(RegistryError::DuplicateMethod(method));
        }

        debug!(method = %method, suppress_response = options.suppress_response, "Registered method");
        self.handlers.insert(
            method,
            HandlerDescriptor {
                handler,
                suppress_response: options.suppress_response,
            },
        );
        Ok(())
    }
}

/// Namespaced view over a [`RegistryBuilder`]
pub struct MethodGroup<'a> {
    builder: &'a mut RegistryBuilder,
    path: String,
}

impl MethodGroup<'_> {
    /// Prefix applied to every method of this group
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method<H>(&mut self, method: &str, handler: H) -> Result<&mut Self, RegistryError>
    where
        H: MethodHandler + 'static,
    {
        self.method_with_options(method, handler, MethodOptions::default())
    }

    pub fn method_with_options<H>(
        &mut self,
        method: &str,
        handler: H,
        options: MethodOptions,
    ) -> Result<&mut Self, RegistryError>
    where
        H: MethodHandler + 'static,
    {
        if method.is_empty() {
            return Err(RegistryError::EmptyMethodName);
        }
        let name = self.qualify(method);
        self.builder.insert(name, Arc::new(handler), options)?;
        Ok(self)
    }

    /// Nested group, `path.prefix`
    pub fn group(&mut self, prefix: &str) -> MethodGroup<'_> {
        let path = self.qualify(prefix);
        MethodGroup {
            builder: &mut *self.builder,
            path,
        }
    }

    fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::error::RpcError;
    use crate::handler::handler_fn;

    fn pong() -> impl MethodHandler {
        handler_fn(|_ctx: RequestContext| async move { Ok::<_, RpcError>("pong") })
    }

    #[test]
    fn test_register_and_lookup() {
        let mut builder = RegistryBuilder::new();
        builder.method("ping", pong()).unwrap();
        let registry = builder.build();

        assert!(registry.lookup("ping").is_some());
        assert!(registry.lookup("Ping").is_none());
        assert!(registry.lookup("pin").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_is_an_error() {
        let mut builder = RegistryBuilder::new();
        builder.method("ping", pong()).unwrap();

        let err = builder.method("ping", pong()).err().unwrap();
        assert_eq!(err, RegistryError::DuplicateMethod("ping".to_string()));
    }

    #[test]
    fn test_empty_method_name_is_rejected() {
        let mut builder = RegistryBuilder::new();
        assert_eq!(
            builder.method("", pong()).err().unwrap(),
            RegistryError::EmptyMethodName
        );
        assert_eq!(
            builder.group("math").method("", pong()).err().unwrap(),
            RegistryError::EmptyMethodName
        );
    }

    #[test]
    fn test_groups_qualify_names() {
        let mut builder = RegistryBuilder::new();
        {
            let mut product = builder.group("Product");
            product.method("UpdateStatus", pong()).unwrap();
            product.group("Stock").method("Get", pong()).unwrap();
        }
        builder.method("ping", pong()).unwrap();

        let registry = builder.build();
        assert_eq!(
            registry.registered_methods(),
            vec!["Product.Stock.Get", "Product.UpdateStatus", "ping"]
        );
    }

    #[test]
    fn test_group_duplicates_detected_on_qualified_name() {
        let mut builder = RegistryBuilder::new();
        builder.method("group.ping", pong()).unwrap();

        let err = builder.group("group").method("ping", pong()).err().unwrap();
        assert_eq!(err, RegistryError::DuplicateMethod("group.ping".to_string()));
    }

    #[test]
    fn test_suppress_response_option() {
        let mut builder = RegistryBuilder::new();
        builder
            .method_with_options("log", pong(), MethodOptions::suppressed())
            .unwrap()
            .method("ping", pong())
            .unwrap();

        let registry = builder.build();
        assert!(registry.lookup("log").unwrap().suppress_response());
        assert!(!registry.lookup("ping").unwrap().suppress_response());
    }
}
