use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::gateway::GatewayConfig;
use crate::middleware::{InvocationContext, Middleware, MiddlewareFactory};

/// Static, per-method configuration paired with a name.
///
/// `descriptor` is opaque to the pipeline (host, path template, verb — the
/// transport decides what it means).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub descriptor: Value,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, descriptor: Value) -> Self {
        Self {
            name: name.into(),
            descriptor,
        }
    }
}

/// A named group of related remote operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

/// Declarative manifest consumed by [`ClientBuilder`](crate::ClientBuilder).
///
/// Resources and methods are kept as vectors so registration order is
/// deterministic, including after a round-trip through JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestDefinition {
    pub resources: Vec<ResourceDefinition>,
    /// Manifest-level gateway configuration; overrides builder-level
    /// defaults key by key.
    #[serde(default)]
    pub gateway_configs: Map<String, Value>,
}

impl ManifestDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource with its ordered method list.
    #[must_use]
    pub fn resource(mut self, name: impl Into<String>, methods: Vec<MethodDescriptor>) -> Self {
        self.resources.push(ResourceDefinition {
            name: name.into(),
            methods,
        });
        self
    }

    /// Set manifest-level gateway configuration.
    #[must_use]
    pub fn gateway_configs(mut self, configs: Map<String, Value>) -> Self {
        self.gateway_configs = configs;
        self
    }
}

/// Registry of resources built once per client: the definition's resources
/// in registration order, the merged gateway configuration, and the ordered
/// middleware factory list.
pub struct Manifest {
    resources: Vec<ResourceDefinition>,
    gateway_configs: GatewayConfig,
    middleware: Vec<Arc<dyn MiddlewareFactory>>,
}

impl std::fmt::Debug for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manifest")
            .field("resources", &self.resources)
            .field("gateway_configs", &self.gateway_configs)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

impl Manifest {
    pub(crate) fn new(
        definition: ManifestDefinition,
        default_gateway_configs: GatewayConfig,
        middleware: Vec<Arc<dyn MiddlewareFactory>>,
    ) -> Self {
        // Shallow merge: manifest-level entries win over builder defaults.
        let mut gateway_configs = default_gateway_configs;
        for (key, value) in definition.gateway_configs {
            gateway_configs.insert(key, value);
        }

        Self {
            resources: definition.resources,
            gateway_configs,
            middleware,
        }
    }

    /// Iterate resources and their ordered method lists, in registration
    /// order. Stable across calls.
    pub fn each_resource(&self) -> impl Iterator<Item = (&str, &[MethodDescriptor])> {
        self.resources
            .iter()
            .map(|resource| (resource.name.as_str(), resource.methods.as_slice()))
    }

    /// The merged gateway configuration.
    pub fn gateway_configs(&self) -> &GatewayConfig {
        &self.gateway_configs
    }

    /// Instantiate the middleware chain for one invocation: every factory,
    /// in registration order, producing a fresh instance.
    pub fn create_middleware(&self, context: &InvocationContext) -> Vec<Box<dyn Middleware>> {
        self.middleware
            .iter()
            .map(|factory| factory.create(context))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Context;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn definition() -> ManifestDefinition {
        ManifestDefinition::new()
            .resource(
                "User",
                vec![
                    MethodDescriptor::new("byId", json!({"path": "/users/:id"})),
                    MethodDescriptor::new("all", json!({"path": "/users"})),
                ],
            )
            .resource(
                "Blog",
                vec![MethodDescriptor::new("post", json!({"path": "/blogs"}))],
            )
    }

    fn invocation() -> InvocationContext {
        InvocationContext {
            resource_name: "User".into(),
            resource_method: "byId".into(),
            context: Context::new(),
        }
    }

    #[test]
    fn test_each_resource_preserves_registration_order() {
        let manifest = Manifest::new(definition(), GatewayConfig::new(), Vec::new());

        let names: Vec<&str> = manifest.each_resource().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["User", "Blog"]);

        let (_, methods) = manifest.each_resource().next().unwrap();
        let method_names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(method_names, vec!["byId", "all"]);

        // Second pass yields the same order.
        let again: Vec<&str> = manifest.each_resource().map(|(name, _)| name).collect();
        assert_eq!(again, names);
    }

    #[test]
    fn test_gateway_configs_merge_manifest_wins() {
        let mut defaults = GatewayConfig::new();
        defaults.insert("host".into(), json!("https://default.example"));
        defaults.insert("timeout".into(), json!(30));

        let definition = definition().gateway_configs(
            json!({"host": "https://override.example", "verify_tls": true})
                .as_object()
                .cloned()
                .unwrap(),
        );

        let manifest = Manifest::new(definition, defaults, Vec::new());
        let configs = manifest.gateway_configs();
        assert_eq!(configs["host"], json!("https://override.example"));
        assert_eq!(configs["timeout"], json!(30));
        assert_eq!(configs["verify_tls"], json!(true));
    }

    #[test]
    fn test_create_middleware_fresh_instances_in_order() {
        struct Tagged;
        impl Middleware for Tagged {}

        static CREATED: AtomicUsize = AtomicUsize::new(0);

        let factory_a: Arc<dyn MiddlewareFactory> =
            Arc::new(|_: &InvocationContext| -> Box<dyn Middleware> {
                CREATED.fetch_add(1, Ordering::SeqCst);
                Box::new(Tagged)
            });
        let factory_b: Arc<dyn MiddlewareFactory> =
            Arc::new(|_: &InvocationContext| -> Box<dyn Middleware> {
                CREATED.fetch_add(1, Ordering::SeqCst);
                Box::new(Tagged)
            });

        let manifest = Manifest::new(
            definition(),
            GatewayConfig::new(),
            vec![factory_a, factory_b],
        );

        let chain = manifest.create_middleware(&invocation());
        assert_eq!(chain.len(), 2);
        assert_eq!(CREATED.load(Ordering::SeqCst), 2);

        // A second invocation gets its own instances.
        let chain = manifest.create_middleware(&invocation());
        assert_eq!(chain.len(), 2);
        assert_eq!(CREATED.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_definition_deserializes_in_order() {
        let raw = r#"{
            "resources": [
                {"name": "User", "methods": [
                    {"name": "byId", "descriptor": {"path": "/users/:id"}},
                    {"name": "all", "descriptor": {"path": "/users"}}
                ]},
                {"name": "Blog", "methods": [
                    {"name": "post", "descriptor": {"path": "/blogs"}}
                ]}
            ]
        }"#;

        let definition: ManifestDefinition = serde_json::from_str(raw).unwrap();
        assert_eq!(definition.resources.len(), 2);
        assert_eq!(definition.resources[0].name, "User");
        assert_eq!(definition.resources[0].methods[0].name, "byId");
        assert!(definition.gateway_configs.is_empty());
    }
}
