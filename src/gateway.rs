use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::request::Request;
use crate::response::Response;

/// Merged gateway configuration: builder-level defaults overridden key by
/// key by manifest-level entries. Opaque to the pipeline, passed verbatim
/// to the gateway.
pub type GatewayConfig = Map<String, Value>;

/// Pluggable transport executor. One instance performs one call.
///
/// The pipeline is agnostic about what happens inside `call` — network
/// exchange, in-process dispatch, or a canned reply in tests.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Perform the exchange for a fully-transformed request.
    ///
    /// # Errors
    /// Transport failures surface as `ClientError` values of the
    /// implementation's choosing; the pipeline forwards them unchanged.
    async fn call(&self, request: Request, configs: &GatewayConfig) -> Result<Response, ClientError>;
}

/// Creates one gateway instance per invocation.
///
/// [`ClientBuilder::build`](crate::ClientBuilder::build) invokes the
/// factory once as a smoke test, so a misconfigured factory fails the
/// build instead of the first real call.
pub trait GatewayFactory: Send + Sync {
    /// # Errors
    /// Returns an error when no gateway can be produced; at build time this
    /// is reported as `ClientError::Configuration`.
    fn create(&self) -> Result<Box<dyn Gateway>, ClientError>;
}

impl<F> GatewayFactory for F
where
    F: Fn() -> Result<Box<dyn Gateway>, ClientError> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn Gateway>, ClientError> {
        self()
    }
}
