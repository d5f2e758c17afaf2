use std::io;

use thiserror::Error;

/// Error taxonomy for client construction and dispatch.
///
/// Construction problems (`Configuration`) are fatal and surface from
/// [`ClientBuilder::build`](crate::ClientBuilder::build) before any client
/// exists. Everything else is call-time: the pipeline propagates whatever a
/// middleware or gateway produced, without wrapping or swallowing it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing/invalid manifest or a gateway factory that cannot produce a
    /// gateway. Reported at build time, never at call time.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("unknown method: {resource}.{method}")]
    UnknownMethod { resource: String, method: String },

    /// A middleware rejected the request during the request phase.
    #[error("request transform error: {0}")]
    Transform(String),

    /// The transport call or a response wrapper failed.
    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}
