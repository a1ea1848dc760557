//! Reactions to special envelope result codes
//!
//! When an envelope reports a non-success code the client consults this
//! registry before failing the call. Handlers run as a side channel: their
//! errors are logged and never reach the caller of the original request.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use portico_core::ResultCode;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Reaction to one special result code
#[async_trait]
pub trait SpecialCodeHandler: Send + Sync {
    async fn handle(&self, code: &ResultCode, msg: &str, data: &JsonValue) -> anyhow::Result<()>;
}

type HandlerFn =
    dyn Fn(ResultCode, String, JsonValue) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// Adapter turning an async closure into a [`SpecialCodeHandler`]
pub struct FnHandler(Box<HandlerFn>);

#[async_trait]
impl SpecialCodeHandler for FnHandler {
    async fn handle(&self, code: &ResultCode, msg: &str, data: &JsonValue) -> anyhow::Result<()> {
        (self.0)(code.clone(), msg.to_string(), data.clone()).await
    }
}

/// Build a handler from an async closure
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn SpecialCodeHandler>
where
    F: Fn(ResultCode, String, JsonValue) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnHandler(Box::new(move |code, msg, data| {
        f(code, msg, data).boxed()
    })))
}

/// Mapping from result code to its handler; one handler per code
#[derive(Default)]
pub struct SpecialCodeRegistry {
    handlers: RwLock<HashMap<ResultCode, Arc<dyn SpecialCodeHandler>>>,
}

impl SpecialCodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `code`, replacing and returning any previous one
    pub fn register(
        &self,
        code: impl Into<ResultCode>,
        handler: Arc<dyn SpecialCodeHandler>,
    ) -> Option<Arc<dyn SpecialCodeHandler>> {
        let code = code.into();
        debug!(code = %code, "Registering special code handler");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code, handler)
    }

    /// Remove the handler for `code`
    pub fn unregister(&self, code: impl Into<ResultCode>) -> Option<Arc<dyn SpecialCodeHandler>> {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&code.into())
    }

    pub fn contains(&self, code: impl Into<ResultCode>) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&code.into())
    }

    /// Run the handler registered for `code`, if any.
    ///
    /// Returns whether a handler ran. Handler failures are logged here and
    /// go no further.
    pub async fn handle(&self, code: &ResultCode, msg: &str, data: &JsonValue) -> bool {
        // Clone out of the lock so handlers may re-enter the registry
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(code)
            .cloned();

        let Some(handler) = handler else {
            return false;
        };

        if let Err(e) = handler.handle(code, msg, data).await {
            error!(code = %code, "Failed to handle special code {code}: {e:#}");
        }
        true
    }

    /// Snapshot of the registered handlers
    pub fn handlers(&self) -> HashMap<ResultCode, Arc<dyn SpecialCodeHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for SpecialCodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut codes: Vec<_> = self.handlers().into_keys().collect();
        codes.sort();
        f.debug_struct("SpecialCodeRegistry")
            .field("codes", &codes)
            .finish()
    }
}
