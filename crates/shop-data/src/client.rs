//! The storefront API client.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::envelope;
use crate::notify::{LogNotifier, Notice, Notifier};
use crate::{ApiError, ErrorKind, HyperTransport, Method, Multipart, RequestBuilder, Transport};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Default global request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bridge to the session owner.
///
/// The client reads the bearer token from it before every request and tells
/// it to drop the session when the server answers 401.
pub trait SessionHook: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
    fn session_expired(&self);
}

/// Events broadcast by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The server rejected the session. Listeners should send the user to
    /// the login entry point.
    Unauthorized { path: String },
}

/// HTTP client for the storefront REST API.
///
/// Cheap to clone; clones share the transport, session hook and event
/// channel.
#[derive(Clone)]
pub struct FetchClient {
    base_url: String,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    session: Option<Arc<dyn SessionHook>>,
    notifier: Arc<dyn Notifier>,
    default_headers: BTreeMap<String, String>,
    events: broadcast::Sender<ClientEvent>,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl FetchClient {
    /// Create a client for `base_url` using the hyper transport.
    pub fn new(base_url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            transport: Arc::new(HyperTransport::new()),
            session: None,
            notifier: Arc::new(LogNotifier),
            default_headers: BTreeMap::new(),
            events,
        }
    }

    /// Replace the transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Set the global request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach the session owner.
    pub fn with_session(mut self, session: Arc<dyn SessionHook>) -> Self {
        self.session = Some(session);
        self
    }

    /// Set where failure notices go.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Subscribe to client events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Create a GET request.
    pub fn get(&self, path: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Get, path)
    }

    /// Create a POST request.
    pub fn post(&self, path: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Post, path)
    }

    /// Create a PUT request.
    pub fn put(&self, path: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Put, path)
    }

    /// Create a PATCH request.
    pub fn patch(&self, path: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Patch, path)
    }

    /// Create a DELETE request.
    pub fn delete(&self, path: impl Into<String>) -> ClientRequestBuilder<'_> {
        self.request(Method::Delete, path)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, path: impl Into<String>) -> ClientRequestBuilder<'_> {
        let mut builder = RequestBuilder::new(method, path);
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }
        ClientRequestBuilder {
            client: self,
            builder,
        }
    }

    async fn execute(&self, mut builder: RequestBuilder) -> Result<Value, ApiError> {
        if let Some(token) = self.session.as_ref().and_then(|s| s.bearer_token()) {
            if !token.is_empty() {
                builder = builder.bearer_auth(token);
            }
        }

        let request = builder.build(&self.base_url);
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "sending request");

        let sent = tokio::time::timeout(self.timeout, self.transport.send(request)).await;
        let result = match sent {
            Err(_) => Err(ApiError::timeout(format!(
                "Request timed out after {}ms",
                self.timeout.as_millis()
            ))),
            Ok(Err(e)) => Err(e),
            Ok(Ok(response)) => match response.error_for_status() {
                Ok(response) => response.payload().and_then(envelope::open),
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(value) => {
                debug!(%method, %path, "request succeeded");
                Ok(value)
            }
            Err(err) => {
                self.on_failure(method, &path, &err);
                Err(err)
            }
        }
    }

    fn on_failure(&self, method: Method, path: &str, err: &ApiError) {
        if err.is_unauthorized() {
            warn!(%method, %path, "session rejected by server, clearing session");
            if let Some(session) = &self.session {
                session.session_expired();
            }
            // No receivers is fine.
            let _ = self.events.send(ClientEvent::Unauthorized {
                path: path.to_string(),
            });
            return;
        }

        error!(
            %method,
            %path,
            status = ?err.status,
            code = %err.code,
            message = %err.message,
            "request failed"
        );

        let message = match err.kind {
            ErrorKind::Forbidden => "Permission denied for this resource".to_string(),
            ErrorKind::NotFound => "The requested resource does not exist".to_string(),
            ErrorKind::Server => "Server error, please retry later".to_string(),
            _ => err.message.clone(),
        };
        self.notifier.notify(Notice::error(message));
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder<'a> {
    client: &'a FetchClient,
    builder: RequestBuilder,
}

impl<'a> ClientRequestBuilder<'a> {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.builder = self.builder.query_opt(key, value);
        self
    }

    /// Set the request body as a string.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.builder = self.builder.text(text);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ApiError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Set a multipart form body.
    pub fn multipart(mut self, form: Multipart) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Send and return the unwrapped payload as raw JSON.
    ///
    /// Envelopes are opened; other bodies are returned as-is.
    pub async fn send_value(self) -> Result<Value, ApiError> {
        self.client.execute(self.builder).await
    }

    /// Send and decode the unwrapped payload.
    ///
    /// A payload that does not decode as `T` is reported like any other
    /// failure.
    pub async fn send<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let client = self.client;
        let method = self.builder.method;
        let path = self.builder.path_and_query();
        let value = self.send_value().await?;
        serde_json::from_value(value).map_err(|e| {
            let err = ApiError::malformed(format!("Unexpected response shape: {}", e));
            client.on_failure(method, &path, &err);
            err
        })
    }

    /// Send and discard the payload.
    pub async fn send_empty(self) -> Result<(), ApiError> {
        self.send_value().await.map(|_| ())
    }
}
