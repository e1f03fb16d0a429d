//! Transport seam between the client and the network.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::{ApiError, Method, Request, Response};

/// Sends one request and returns the raw response.
///
/// Implementations report only transport failures as errors; every HTTP
/// status, including 4xx/5xx, is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, ApiError>;
}

/// Plain-HTTP transport backed by the hyper connection-pooling client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

fn to_http_method(method: Method) -> http::Method {
    match method {
        Method::Get => http::Method::GET,
        Method::Post => http::Method::POST,
        Method::Put => http::Method::PUT,
        Method::Patch => http::Method::PATCH,
        Method::Delete => http::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: Request) -> Result<Response, ApiError> {
        if request.url.starts_with("https://") {
            return Err(ApiError::network(format!(
                "https is not supported by the built-in transport: {}",
                request.url
            )));
        }

        let uri: http::Uri = request
            .url
            .parse()
            .map_err(|e| ApiError::network(format!("Invalid URL {}: {}", request.url, e)))?;

        let mut builder = http::Request::builder()
            .method(to_http_method(request.method))
            .uri(uri)
            .header("Accept", "application/json");
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let body = Full::new(Bytes::from(request.body.unwrap_or_default()));
        let http_request = builder
            .body(body)
            .map_err(|e| ApiError::network(e.to_string()))?;

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| ApiError::network(format!("Network error: {}", e)))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e: hyper::Error| {
                ApiError::network(format!("Failed to read response body: {}", e))
            })?
            .to_bytes();

        Ok(Response::new(status, headers, body.to_vec()))
    }
}
