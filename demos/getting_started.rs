//! Build a client from a manifest and call it through an in-memory gateway.
//!
//! Run with: `cargo run --example getting_started`

use async_trait::async_trait;
use http::StatusCode;
use manifest_client::{
    Client, ClientError, Gateway, GatewayConfig, ManifestDefinition, MethodDescriptor, Request,
    Response,
};
use serde_json::json;

/// A gateway that fabricates responses instead of hitting the network.
struct InMemoryGateway;

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn call(&self, request: Request, configs: &GatewayConfig) -> Result<Response, ClientError> {
        println!(
            "gateway called: descriptor={} params={} host={}",
            request.descriptor(),
            serde_json::to_string(request.params()).unwrap_or_default(),
            configs.get("host").cloned().unwrap_or_default()
        );
        Response::from_json(StatusCode::OK, &json!({"id": request.param("id")}))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let definition = ManifestDefinition::new().resource(
        "User",
        vec![
            MethodDescriptor::new("byId", json!({"path": "/users/:id"})),
            MethodDescriptor::new("all", json!({"path": "/users"})),
        ],
    );

    let client = Client::builder(definition)
        .gateway_configs(
            json!({"host": "https://api.example.com"})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .gateway(|| -> Result<Box<dyn Gateway>, ClientError> { Ok(Box::new(InMemoryGateway)) })
        .build()?;

    let mut params = serde_json::Map::new();
    params.insert("id".into(), json!(42));

    let response = client.resource("User")?.method("byId")?.call(params).await?;
    println!("status: {}", response.status());
    println!("body:   {}", response.text()?);

    Ok(())
}
