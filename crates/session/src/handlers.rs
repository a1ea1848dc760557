//! Default reactions to auth-related result codes

use crate::store::UserStore;
use async_trait::async_trait;
use portico_core::ResultCode;
use portico_http::{SpecialCodeHandler, SpecialCodeRegistry};
use serde_json::Value as JsonValue;
use std::sync::{Arc, Weak};
use tracing::warn;

/// Ends the session and sends the user to the login route
pub struct EndSession {
    store: Weak<UserStore>,
    reason: &'static str,
}

impl EndSession {
    pub fn new(store: Weak<UserStore>, reason: &'static str) -> Self {
        Self { store, reason }
    }
}

#[async_trait]
impl SpecialCodeHandler for EndSession {
    async fn handle(&self, code: &ResultCode, msg: &str, _data: &JsonValue) -> anyhow::Result<()> {
        warn!(code = %code, "{}: {msg}", self.reason);

        // The store is gone once the application shuts down
        let Some(store) = self.store.upgrade() else {
            return Ok(());
        };
        store.logout_with_query_redirect(None).await?;
        Ok(())
    }
}

/// Reports a permission failure without touching the session
pub struct PermissionDenied;

#[async_trait]
impl SpecialCodeHandler for PermissionDenied {
    async fn handle(&self, code: &ResultCode, msg: &str, _data: &JsonValue) -> anyhow::Result<()> {
        warn!(code = %code, "Permission denied: {msg}");
        Ok(())
    }
}

/// Handlers for the codes the backend uses to signal auth failures
pub fn default_special_code_handlers(
    store: &Arc<UserStore>,
) -> Vec<(ResultCode, Arc<dyn SpecialCodeHandler>)> {
    let end_session = |reason| -> Arc<dyn SpecialCodeHandler> {
        Arc::new(EndSession::new(Arc::downgrade(store), reason))
    };
    let permission_denied: Arc<dyn SpecialCodeHandler> = Arc::new(PermissionDenied);

    vec![
        (
            ResultCode::LOGIN_EXPIRED.into(),
            end_session("Login expired"),
        ),
        (ResultCode::PERMISSION_DENIED.into(), permission_denied),
        (
            ResultCode::ACCOUNT_LOCKED.into(),
            end_session("Account locked"),
        ),
        (
            ResultCode::RELOGIN_REQUIRED.into(),
            end_session("Login required"),
        ),
    ]
}

/// Register the default handlers with `registry`
pub fn install_default_handlers(registry: &SpecialCodeRegistry, store: &Arc<UserStore>) {
    for (code, handler) in default_special_code_handlers(store) {
        registry.register(code, handler);
    }
}
