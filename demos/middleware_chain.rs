//! Demonstrates the onion: request transforms run in registration order,
//! response wrappers are entered in reverse.
//!
//! Run with: `cargo run --example middleware_chain`

use async_trait::async_trait;
use http::StatusCode;
use manifest_client::{
    Client, ClientError, Gateway, GatewayConfig, InvocationContext, ManifestDefinition,
    MethodDescriptor, Middleware, Next, Request, Response,
};
use serde_json::{Value, json};

struct Announcer {
    name: &'static str,
}

#[async_trait]
impl Middleware for Announcer {
    async fn transform_request(&self, request: Request) -> Result<Request, ClientError> {
        println!("[{}] transform_request", self.name);
        Ok(request)
    }

    async fn wrap_response(&self, next: Next) -> Result<Response, ClientError> {
        println!("[{}] wrap_response: delegating inward", self.name);
        let response = next.run().await;
        println!("[{}] wrap_response: response is back", self.name);
        response
    }
}

/// Injects a bearer token taken from the per-call context copy.
struct Auth {
    token: String,
}

#[async_trait]
impl Middleware for Auth {
    async fn transform_request(&self, request: Request) -> Result<Request, ClientError> {
        Ok(request.with_param("headers", json!({"authorization": format!("Bearer {}", self.token)})))
    }
}

struct EchoGateway;

#[async_trait]
impl Gateway for EchoGateway {
    async fn call(&self, request: Request, _configs: &GatewayConfig) -> Result<Response, ClientError> {
        println!("[gateway] performing the exchange");
        Response::from_json(StatusCode::OK, &json!({"params": request.params()}))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let definition = ManifestDefinition::new().resource(
        "Blog",
        vec![MethodDescriptor::new("post", json!({"method": "POST", "path": "/blogs"}))],
    );

    let client = Client::builder(definition)
        .context(
            json!({"token": "s3cr3t"})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .gateway(|| -> Result<Box<dyn Gateway>, ClientError> { Ok(Box::new(EchoGateway)) })
        .middleware(|_: &InvocationContext| -> Box<dyn Middleware> {
            Box::new(Announcer { name: "first" })
        })
        .middleware(|ctx: &InvocationContext| -> Box<dyn Middleware> {
            let token = ctx
                .context
                .get("token")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            Box::new(Auth { token })
        })
        .middleware(|_: &InvocationContext| -> Box<dyn Middleware> {
            Box::new(Announcer { name: "last" })
        })
        .build()?;

    let mut params = serde_json::Map::new();
    params.insert("title".into(), json!("Onions all the way down"));

    let response = client.resource("Blog")?.method("post")?.call(params).await?;
    println!("status: {}", response.status());
    println!("body:   {}", response.text()?);

    Ok(())
}
