//! # HTTP Transport
//!
//! [`Transport`] implementation backed by `reqwest`.

use crate::document::{RawResponse, WireDocument};
use crate::error::TransportError;
use crate::transport::{Method, Transport};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, warn};

/// Media type for JSON:API bodies.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Sends JSON:API requests over HTTP.
///
/// An empty reply body means "no payload". A body that is not a JSON:API
/// document is logged and also treated as no payload. Non-2xx replies fail
/// with [`TransportError::Status`], carrying the decoded reply.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport with a default client.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder().build().map_err(TransportError::Client)?;
        Ok(Self::with_client(client))
    }

    /// Uses a preconfigured client (proxies, default headers, TLS roots).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&WireDocument>,
    ) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(method.into(), path)
            .header(ACCEPT, JSON_API_MEDIA_TYPE);

        if let Some(document) = body {
            let bytes = serde_json::to_vec(document).map_err(|e| TransportError::Body {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            builder = builder.header(CONTENT_TYPE, JSON_API_MEDIA_TYPE).body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| TransportError::Connection {
                path: path.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or("").to_string()))
            .collect();
        let bytes = response.bytes().await.map_err(|e| TransportError::Body {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        debug!(%method, path, status, len = bytes.len(), "Response received");

        let raw = RawResponse {
            status,
            headers,
            data: decode_payload(path, &bytes),
        };
        if !raw.is_success() {
            return Err(TransportError::Status {
                path: path.to_string(),
                status,
                response: raw,
            });
        }
        Ok(raw)
    }
}

fn decode_payload(path: &str, bytes: &[u8]) -> Option<WireDocument> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!(path, error = %e, "Response body is not a JSON:API document");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_builds() {
        assert!(HttpTransport::new().is_ok());
    }

    #[test]
    fn test_decode_payload() {
        assert!(decode_payload("/a", b"").is_none());
        assert!(decode_payload("/a", b"  \n").is_none());
        assert!(decode_payload("/a", b"<html></html>").is_none());
        assert!(decode_payload("/a", b"[1, 2]").is_none());

        let document = decode_payload("/a", br#"{"data":{"type":"authors","id":"1"}}"#).unwrap();
        assert!(document.data.is_some());
    }
}
