use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Response value produced by a gateway and threaded back through the
/// middleware chain.
///
/// The body is buffered; streaming consumption belongs to concrete
/// transports. Consumers read it with [`json`](Response::json),
/// [`text`](Response::text) or [`body`](Response::body); middleware that
/// rewrites a response uses the `with_*` producers, which return a new
/// value.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Create a response from components.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Create a response with a JSON-serialized body and no extra headers.
    ///
    /// # Errors
    /// Returns `ClientError::Serialization` if `value` cannot be serialized.
    pub fn from_json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, ClientError> {
        let body = serde_json::to_vec(value)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(Self::new(status, headers, body))
    }

    /// HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The buffered body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return the body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    /// Returns `ClientError::Serialization` if the body is not valid JSON
    /// for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let value = serde_json::from_slice(&self.body)?;
        Ok(value)
    }

    /// Interpret the body as UTF-8 text.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidResponse` if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, ClientError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| ClientError::InvalidResponse(format!("invalid UTF-8: {e}")))
    }

    /// New response with a different status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// New response with a header added or replaced.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidResponse` for malformed header names or
    /// values.
    pub fn with_header<K, V>(mut self, key: K, value: V) -> Result<Self, ClientError>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: std::fmt::Display,
        V::Error: std::fmt::Display,
    {
        let key = key
            .try_into()
            .map_err(|e| ClientError::InvalidResponse(format!("invalid header name: {e}")))?;
        let value = value
            .try_into()
            .map_err(|e| ClientError::InvalidResponse(format!("invalid header value: {e}")))?;
        self.headers.insert(key, value);
        Ok(self)
    }

    /// New response with the body replaced.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_sets_content_type() {
        let response = Response::from_json(StatusCode::OK, &json!({"ok": true})).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[test]
    fn test_text() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), "Hello, World!");
        assert_eq!(response.text().unwrap(), "Hello, World!");
    }

    #[test]
    fn test_text_invalid_utf8() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), vec![0xff, 0xfe]);
        assert!(matches!(
            response.text(),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_producers() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), "original")
            .with_status(StatusCode::CREATED)
            .with_header("x-cache", "hit")
            .unwrap()
            .with_body("rewritten");

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-cache").unwrap(), "hit");
        assert_eq!(response.text().unwrap(), "rewritten");
    }
}
