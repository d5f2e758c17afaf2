use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::gateway::{GatewayConfig, GatewayFactory};
use crate::manifest::{Manifest, ManifestDefinition};
use crate::middleware::{Context, InvocationContext, MiddlewareFactory, Next};
use crate::request::{Params, Request};
use crate::response::Response;

/// Builder for a [`Client`]. Validates its two mandatory inputs — a
/// non-empty manifest and a working gateway factory — before any client
/// object exists.
pub struct ClientBuilder {
    definition: ManifestDefinition,
    gateway: Option<Arc<dyn GatewayFactory>>,
    gateway_configs: GatewayConfig,
    middleware: Vec<Arc<dyn MiddlewareFactory>>,
    context: Context,
}

impl ClientBuilder {
    pub fn new(definition: ManifestDefinition) -> Self {
        Self {
            definition,
            gateway: None,
            gateway_configs: GatewayConfig::new(),
            middleware: Vec::new(),
            context: Context::new(),
        }
    }

    /// Set the gateway factory. Mandatory.
    #[must_use]
    pub fn gateway(mut self, factory: impl GatewayFactory + 'static) -> Self {
        self.gateway = Some(Arc::new(factory));
        self
    }

    /// Default gateway configuration; manifest-level entries override these
    /// key by key.
    #[must_use]
    pub fn gateway_configs(mut self, configs: GatewayConfig) -> Self {
        self.gateway_configs = configs;
        self
    }

    /// Register a middleware factory. Registration order fixes the chain
    /// order for every invocation: request transforms run first-to-last,
    /// response wrappers are entered last-to-first.
    #[must_use]
    pub fn middleware(mut self, factory: impl MiddlewareFactory + 'static) -> Self {
        self.middleware.push(Arc::new(factory));
        self
    }

    /// Shared context data handed to middleware factories; each invocation
    /// receives its own shallow copy.
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Materialize the client: validate, then walk the manifest and install
    /// one dispatch entry per (resource, method) pair.
    ///
    /// # Errors
    /// `ClientError::Configuration` for a manifest with no resources, a
    /// missing gateway factory, or a factory whose smoke-test `create()`
    /// fails. Gateway misconfiguration discovered on the first real call is
    /// a worse failure mode, so it is checked here.
    pub fn build(self) -> Result<Client, ClientError> {
        if self.definition.resources.is_empty() {
            return Err(ClientError::Configuration(
                "invalid manifest: no resources defined".into(),
            ));
        }

        let gateway = self
            .gateway
            .ok_or_else(|| ClientError::Configuration("gateway not configured".into()))?;
        gateway
            .create()
            .map_err(|e| ClientError::Configuration(format!("gateway not configured: {e}")))?;

        let manifest = Arc::new(Manifest::new(
            self.definition,
            self.gateway_configs,
            self.middleware,
        ));

        let mut dispatch: HashMap<String, HashMap<String, Arc<Value>>> = HashMap::new();
        for (resource, methods) in manifest.each_resource() {
            let entry = dispatch.entry(resource.to_owned()).or_default();
            for method in methods {
                entry.insert(method.name.clone(), Arc::new(method.descriptor.clone()));
            }
        }

        debug!(resources = dispatch.len(), "client built");
        Ok(Client {
            manifest,
            gateway,
            context: self.context,
            dispatch,
        })
    }
}

/// Callable client whose shape mirrors the manifest: resource name →
/// method name → callable. Built once, immutable thereafter.
pub struct Client {
    manifest: Arc<Manifest>,
    gateway: Arc<dyn GatewayFactory>,
    context: Context,
    dispatch: HashMap<String, HashMap<String, Arc<Value>>>,
}

impl Client {
    /// Start building a client from a manifest definition.
    pub fn builder(definition: ManifestDefinition) -> ClientBuilder {
        ClientBuilder::new(definition)
    }

    /// Read-only back-reference to the underlying manifest, for
    /// introspection by external collaborators.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Handle to one resource of the client.
    ///
    /// # Errors
    /// `ClientError::UnknownResource` if the manifest defines no resource
    /// with this name.
    pub fn resource<'a>(&'a self, name: &str) -> Result<Resource<'a>, ClientError> {
        let (name, methods) = self
            .dispatch
            .get_key_value(name)
            .ok_or_else(|| ClientError::UnknownResource(name.to_owned()))?;
        Ok(Resource {
            client: self,
            name,
            methods,
        })
    }

    /// Invoke `resource.method(params)` through the middleware pipeline.
    ///
    /// # Errors
    /// Lookup misses surface as `UnknownResource`/`UnknownMethod`;
    /// everything else is whatever the failing middleware or gateway
    /// produced, unchanged.
    pub async fn call(
        &self,
        resource: &str,
        method: &str,
        params: Params,
    ) -> Result<Response, ClientError> {
        self.resource(resource)?.method(method)?.call(params).await
    }

    /// The dispatch pipeline for one invocation.
    ///
    /// Request phase folds the chain forward in registration order; the
    /// response phase composes wrappers in the same order so that the
    /// last-registered middleware ends up outermost, wrapping everything
    /// down to the gateway thunk. An empty chain degenerates to the bare
    /// gateway call.
    async fn invoke(
        &self,
        resource_name: &str,
        resource_method: &str,
        descriptor: Arc<Value>,
        params: Params,
    ) -> Result<Response, ClientError> {
        let invocation = InvocationContext {
            resource_name: resource_name.to_owned(),
            resource_method: resource_method.to_owned(),
            context: self.context.clone(),
        };
        let chain = self.manifest.create_middleware(&invocation);
        debug!(
            resource = resource_name,
            method = resource_method,
            middleware = chain.len(),
            "dispatching"
        );

        let mut request = Request::new(descriptor, params);
        for middleware in &chain {
            request = middleware.transform_request(request).await?;
        }

        let gateway = self.gateway.create()?;
        let configs = self.manifest.gateway_configs().clone();
        let mut execute = Next::gateway(gateway, request, configs);
        for middleware in chain {
            execute = execute.wrap(middleware);
        }
        execute.run().await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("manifest", &self.manifest)
            .field("resources", &self.dispatch.len())
            .finish()
    }
}

/// Handle to one resource, mirroring `client[resource]`.
#[derive(Clone, Copy)]
pub struct Resource<'a> {
    client: &'a Client,
    name: &'a str,
    methods: &'a HashMap<String, Arc<Value>>,
}

impl<'a> Resource<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    /// Bind one method of this resource, mirroring
    /// `client[resource][method]`.
    ///
    /// # Errors
    /// `ClientError::UnknownMethod` if the resource defines no method with
    /// this name.
    pub fn method(&self, name: &str) -> Result<BoundMethod<'a>, ClientError> {
        let (name, descriptor) =
            self.methods
                .get_key_value(name)
                .ok_or_else(|| ClientError::UnknownMethod {
                    resource: self.name.to_owned(),
                    method: name.to_owned(),
                })?;
        Ok(BoundMethod {
            client: self.client,
            resource: self.name,
            method: name,
            descriptor: Arc::clone(descriptor),
        })
    }

    /// Shorthand for `self.method(name)?.call(params)`.
    ///
    /// # Errors
    /// See [`Resource::method`] and [`BoundMethod::call`].
    pub async fn call(&self, method: &str, params: Params) -> Result<Response, ClientError> {
        self.method(method)?.call(params).await
    }
}

/// A (resource, method) pair ready to be invoked with runtime arguments.
pub struct BoundMethod<'a> {
    client: &'a Client,
    resource: &'a str,
    method: &'a str,
    descriptor: Arc<Value>,
}

impl BoundMethod<'_> {
    /// Run the pipeline for this method with the given arguments.
    ///
    /// # Errors
    /// Propagates the failing layer's error unchanged.
    pub async fn call(&self, params: Params) -> Result<Response, ClientError> {
        self.client
            .invoke(self.resource, self.method, Arc::clone(&self.descriptor), params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use crate::manifest::MethodDescriptor;
    use async_trait::async_trait;
    use http::StatusCode;
    use serde_json::json;

    struct NullGateway;

    #[async_trait]
    impl Gateway for NullGateway {
        async fn call(
            &self,
            _request: Request,
            _configs: &GatewayConfig,
        ) -> Result<Response, ClientError> {
            Response::from_json(StatusCode::OK, &json!({}))
        }
    }

    fn definition() -> ManifestDefinition {
        ManifestDefinition::new().resource(
            "User",
            vec![MethodDescriptor::new("byId", json!({"path": "/users/:id"}))],
        )
    }

    fn null_gateway_factory() -> impl GatewayFactory {
        || -> Result<Box<dyn Gateway>, ClientError> { Ok(Box::new(NullGateway)) }
    }

    #[test]
    fn test_build_rejects_empty_manifest_before_touching_gateway() {
        let poisoned = || -> Result<Box<dyn Gateway>, ClientError> {
            panic!("gateway factory must not be consulted for an invalid manifest")
        };

        let err = ClientBuilder::new(ManifestDefinition::new())
            .gateway(poisoned)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
        assert!(err.to_string().contains("invalid manifest"));
    }

    #[test]
    fn test_build_rejects_missing_gateway() {
        let err = ClientBuilder::new(definition()).build().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
        assert!(err.to_string().contains("gateway not configured"));
    }

    #[test]
    fn test_build_rejects_failing_gateway_factory() {
        let broken = || -> Result<Box<dyn Gateway>, ClientError> {
            Err(ClientError::Gateway("no transport available".into()))
        };

        let err = ClientBuilder::new(definition())
            .gateway(broken)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
        assert!(err.to_string().contains("gateway not configured"));
    }

    #[test]
    fn test_build_mirrors_manifest_shape() {
        let client = ClientBuilder::new(definition())
            .gateway(null_gateway_factory())
            .build()
            .unwrap();

        let resource = client.resource("User").unwrap();
        assert_eq!(resource.name(), "User");
        assert!(resource.method("byId").is_ok());

        assert!(matches!(
            client.resource("Account"),
            Err(ClientError::UnknownResource(_))
        ));
        assert!(matches!(
            resource.method("all"),
            Err(ClientError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_manifest_backreference() {
        let client = ClientBuilder::new(definition())
            .gateway(null_gateway_factory())
            .build()
            .unwrap();

        let names: Vec<&str> = client.manifest().each_resource().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["User"]);
    }
}
