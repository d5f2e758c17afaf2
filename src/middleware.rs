use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::gateway::{Gateway, GatewayConfig};
use crate::request::Request;
use crate::response::Response;

/// Shared caller-supplied context data (auth/session material and the
/// like). Each invocation receives its own shallow copy.
pub type Context = Map<String, Value>;

/// Per-call identity used to instantiate middleware: which resource and
/// method are being invoked, plus a private copy of the client context.
///
/// Built fresh for every call; mutating `context` here is never visible to
/// any other invocation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub resource_name: String,
    pub resource_method: String,
    pub context: Context,
}

/// One-shot continuation that, when run, produces the (possibly
/// further-wrapped) response.
///
/// A [`Middleware::wrap_response`] implementation may run it zero times
/// (short-circuit — the rest of the chain and the gateway are never
/// touched), once, or once and recover from its failure. It cannot run
/// twice.
pub struct Next {
    inner: Box<dyn FnOnce() -> BoxFuture<'static, Result<Response, ClientError>> + Send>,
}

impl Next {
    fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, Result<Response, ClientError>> + Send + 'static,
    {
        Self { inner: Box::new(f) }
    }

    /// Innermost continuation: a fresh gateway instance performing the
    /// transport call with the fully-transformed request.
    pub(crate) fn gateway(gateway: Box<dyn Gateway>, request: Request, configs: GatewayConfig) -> Self {
        Self::new(move || {
            let fut: BoxFuture<'static, Result<Response, ClientError>> =
                Box::pin(async move { gateway.call(request, &configs).await });
            fut
        })
    }

    /// Compose a wrapper around this continuation; the wrapper becomes the
    /// new outermost layer.
    pub(crate) fn wrap(self, middleware: Box<dyn Middleware>) -> Self {
        Self::new(move || {
            let fut: BoxFuture<'static, Result<Response, ClientError>> =
                Box::pin(async move { middleware.wrap_response(self).await });
            fut
        })
    }

    /// Delegate inward and wait for the wrapped response.
    ///
    /// # Errors
    /// Propagates whatever error an inner wrapper or the gateway produced,
    /// unchanged.
    pub async fn run(self) -> Result<Response, ClientError> {
        (self.inner)().await
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Next(..)")
    }
}

/// Per-invocation request/response transformer.
///
/// Both methods default to identity, so a middleware may implement either
/// phase, both, or neither (a fully inert middleware is legal).
///
/// Request transforms run in registration order; response wrappers are
/// entered in reverse registration order — the last-registered middleware
/// sees the response pipeline first and decides whether and when to
/// delegate inward through `next`.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Request phase: consume the previous request, produce the next one.
    ///
    /// An error here aborts the call immediately; no later transform and no
    /// response wrapper executes.
    ///
    /// # Errors
    /// Implementations reject the request by returning any `ClientError`.
    async fn transform_request(&self, request: Request) -> Result<Request, ClientError> {
        Ok(request)
    }

    /// Response phase: wrap the continuation that produces the response.
    ///
    /// # Errors
    /// Failures from `next` pass through unless the implementation chooses
    /// to recover.
    async fn wrap_response(&self, next: Next) -> Result<Response, ClientError> {
        next.run().await
    }
}

/// Creates one middleware instance per invocation.
///
/// Factories must be independent across invocations: instantiating a chain
/// for one call must not observably affect another call's instances. A
/// factory that deliberately shares state (e.g. a cache) owns that
/// contract.
pub trait MiddlewareFactory: Send + Sync {
    fn create(&self, context: &InvocationContext) -> Box<dyn Middleware>;
}

impl<F> MiddlewareFactory for F
where
    F: Fn(&InvocationContext) -> Box<dyn Middleware> + Send + Sync,
{
    fn create(&self, context: &InvocationContext) -> Box<dyn Middleware> {
        self(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert;

    impl Middleware for Inert {}

    #[test]
    fn test_inert_middleware_is_legal() {
        // Neither capability implemented; both phases fall back to identity.
        let _boxed: Box<dyn Middleware> = Box::new(Inert);
    }

    #[test]
    fn test_closure_factory() {
        let factory = |_: &InvocationContext| -> Box<dyn Middleware> { Box::new(Inert) };
        let context = InvocationContext {
            resource_name: "User".into(),
            resource_method: "byId".into(),
            context: Context::new(),
        };
        let _middleware = MiddlewareFactory::create(&factory, &context);
    }
}
