use std::sync::Arc;

use serde_json::{Map, Value};

/// Named runtime arguments supplied by the caller for one invocation.
pub type Params = Map<String, Value>;

/// Immutable value representing one call attempt: the method's static
/// descriptor plus the caller's runtime arguments.
///
/// Transforms never mutate a request in place; every helper returns a new
/// `Request`. The descriptor is shared behind an `Arc`, so producing a new
/// request is cheap. The pipeline carries both fields opaquely — what the
/// descriptor contains (host, path template, ...) is the transport's
/// business.
#[derive(Debug, Clone)]
pub struct Request {
    descriptor: Arc<Value>,
    params: Params,
}

impl Request {
    /// Pure value constructor; performs no I/O and no validation of the
    /// argument content.
    pub fn new(descriptor: Arc<Value>, params: Params) -> Self {
        Self { descriptor, params }
    }

    /// The method's static configuration.
    pub fn descriptor(&self) -> &Value {
        &self.descriptor
    }

    /// The runtime arguments for this call.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Look up a single runtime argument by name.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// New request with one parameter added or replaced.
    #[must_use]
    pub fn with_param(&self, name: impl Into<String>, value: Value) -> Self {
        let mut params = self.params.clone();
        params.insert(name.into(), value);
        Self {
            descriptor: Arc::clone(&self.descriptor),
            params,
        }
    }

    /// New request with the parameter map replaced wholesale.
    #[must_use]
    pub fn with_params(&self, params: Params) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            params,
        }
    }

    /// New request with the parameters rewritten by `f`.
    #[must_use]
    pub fn map_params(&self, f: impl FnOnce(Params) -> Params) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            params: f(self.params.clone()),
        }
    }

    /// New request with a different static descriptor.
    #[must_use]
    pub fn with_descriptor(&self, descriptor: Value) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            params: self.params.clone(),
        }
    }
}
