//! Production transport backed by `reqwest`.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{RequestBody, RequestDescriptor};
use crate::response::TransportResponse;
use crate::transport::HttpTransport;

/// An [`HttpTransport`] executing calls through a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport reusing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|error| TransportError::Network(error.to_string()))?;

        let mut builder = self.client.request(method, request.normalized_url());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let RequestBody::Bytes(bytes) = &request.body {
            builder = builder.body(bytes.clone());
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_error(error: reqwest::Error) -> TransportError {
    TransportError::Network(error.to_string())
}
