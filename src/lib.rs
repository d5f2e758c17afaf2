//! Manifest-driven API client with an onion-style middleware pipeline.
//!
//! A declarative [`ManifestDefinition`] (resource name → ordered method
//! descriptors) is materialized into a callable [`Client`]. Every
//! invocation flows through an ordered, bidirectional chain of
//! [`Middleware`] before a pluggable [`Gateway`] performs the actual
//! exchange:
//!
//! - **request phase** — each middleware's `transform_request` runs in
//!   registration order, each consuming the previous result (requests are
//!   immutable values, never mutated in place);
//! - **response phase** — `wrap_response` continuations compose so that the
//!   last-registered middleware is entered first and the first-registered
//!   one wraps the gateway call directly. A wrapper may delegate inward,
//!   transform the result, recover from a failure, or short-circuit
//!   without touching the gateway at all.
//!
//! The crate performs no network I/O itself: transports, serialization
//! semantics, retries, and caching all live behind the [`Gateway`] and
//! [`Middleware`] traits.
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use http::StatusCode;
//! use manifest_client::{
//!     Client, ClientError, Gateway, GatewayConfig, ManifestDefinition, MethodDescriptor,
//!     Request, Response,
//! };
//! use serde_json::json;
//!
//! struct EchoGateway;
//!
//! #[async_trait]
//! impl Gateway for EchoGateway {
//!     async fn call(
//!         &self,
//!         request: Request,
//!         _configs: &GatewayConfig,
//!     ) -> Result<Response, ClientError> {
//!         Response::from_json(StatusCode::OK, &json!({"id": request.param("id")}))
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = ManifestDefinition::new().resource(
//!     "User",
//!     vec![MethodDescriptor::new("byId", json!({"path": "/users/:id"}))],
//! );
//!
//! let client = Client::builder(definition)
//!     .gateway(|| -> Result<Box<dyn Gateway>, ClientError> { Ok(Box::new(EchoGateway)) })
//!     .build()?;
//!
//! let mut params = serde_json::Map::new();
//! params.insert("id".into(), json!(42));
//! let response = client.resource("User")?.method("byId")?.call(params).await?;
//! assert_eq!(response.status(), StatusCode::OK);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod gateway;
mod manifest;
mod middleware;
mod request;
mod response;

// Re-export public API
pub use client::{BoundMethod, Client, ClientBuilder, Resource};
pub use error::ClientError;
pub use gateway::{Gateway, GatewayConfig, GatewayFactory};
pub use manifest::{Manifest, ManifestDefinition, MethodDescriptor, ResourceDefinition};
pub use middleware::{Context, InvocationContext, Middleware, MiddlewareFactory, Next};
pub use request::{Params, Request};
pub use response::Response;

// Re-export commonly used types from dependencies
pub use http::{HeaderMap, StatusCode};
