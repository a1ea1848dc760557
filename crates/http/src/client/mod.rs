//! Portico API client

pub mod error;
pub mod policy;
pub mod registry;
pub mod token;
pub mod unwrap;

use error::ClientError;
use policy::{PropagateErrors, TransportErrorHandler};
use portico_core::{ClientConfig, MemoryStorage, SharedStorage};
use registry::SpecialCodeRegistry;
use reqwest::{Client, ClientBuilder, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// A request plus the per-request switches the client honours
#[must_use]
pub struct ApiRequest {
    builder: reqwest::RequestBuilder,
    add_token: bool,
    handle_special_codes: bool,
}

impl ApiRequest {
    fn new(builder: reqwest::RequestBuilder) -> Self {
        Self {
            builder,
            add_token: true,
            handle_special_codes: true,
        }
    }

    /// Send without the stored bearer token
    pub fn without_token(mut self) -> Self {
        self.add_token = false;
        self
    }

    /// Fail on non-success codes without consulting the special code registry
    pub fn without_special_codes(mut self) -> Self {
        self.handle_special_codes = false;
        self
    }

    /// Set a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    /// Append query parameters
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    /// Add a header
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }
}

/// Envelope-aware API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    storage: SharedStorage,
    registry: Arc<SpecialCodeRegistry>,
    error_handler: Arc<dyn TransportErrorHandler>,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Storage the bearer token is read from
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Registry consulted for non-success result codes
    pub fn registry(&self) -> &Arc<SpecialCodeRegistry> {
        &self.registry
    }

    /// Create a request for `path` relative to the base URL
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        let url = format!("{}{}", self.base_url, path);
        ApiRequest::new(self.client.request(method, url))
    }

    pub fn get(&self, path: &str) -> ApiRequest {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> ApiRequest {
        self.request(Method::POST, path)
    }

    /// Execute a request and deserialize the unwrapped payload
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let payload = self.execute_raw(request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Execute a request and return the unwrapped payload as JSON
    pub async fn execute_raw(&self, request: ApiRequest) -> Result<JsonValue, ClientError> {
        let ApiRequest {
            builder,
            add_token,
            handle_special_codes,
        } = request;

        let builder = if add_token {
            token::attach_token(builder, self.storage.as_ref())
        } else {
            builder
        };

        let body = match self.send(builder).await {
            Ok(body) => body,
            Err(error) => return self.error_handler.handle_error(error),
        };

        let registry = handle_special_codes.then(|| self.registry.as_ref());
        unwrap::unwrap_response(body, registry).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<JsonValue, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            warn!(status = status.as_u16(), "Request failed: {message}");
            return Err(ClientError::from_status(status, message));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(JsonValue::Null);
        }

        // Plain text bodies are handed back as a JSON string
        Ok(serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(&bytes).into_owned())))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    storage: Option<SharedStorage>,
    registry: Option<Arc<SpecialCodeRegistry>>,
    error_handler: Option<Arc<dyn TransportErrorHandler>>,
}

impl ApiClientBuilder {
    /// Take base URL, timeout and user agent from `config`
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.base_url = Some(config.base_url.clone());
        self.timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        self.user_agent = Some(config.user_agent.clone());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the storage holding the token pair
    pub fn storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Share a special code registry with the client
    pub fn registry(mut self, registry: Arc<SpecialCodeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the transport error policy
    pub fn error_handler<H: TransportErrorHandler + 'static>(mut self, handler: H) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder =
                client_builder.user_agent(concat!("portico/", env!("CARGO_PKG_VERSION")));
        }

        let client = client_builder.build()?;

        let storage = self.storage.unwrap_or_else(|| {
            debug!("No storage configured, tokens will not outlive the process");
            Arc::new(MemoryStorage::new())
        });

        Ok(ApiClient {
            client,
            base_url,
            storage,
            registry: self.registry.unwrap_or_default(),
            error_handler: self
                .error_handler
                .unwrap_or_else(|| Arc::new(PropagateErrors)),
        })
    }
}
