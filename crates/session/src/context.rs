//! Startup wiring

use crate::error::SessionError;
use crate::handlers::install_default_handlers;
use crate::router::Router;
use crate::store::{NavigationPaths, UserStore};
use portico_core::{ClientConfig, FileStorage, SharedStorage};
use portico_http::{ApiClient, SpecialCodeRegistry};
use std::sync::Arc;
use tracing::debug;

/// The client, registry and store of one application, wired together
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub client: ApiClient,
    pub registry: Arc<SpecialCodeRegistry>,
    pub store: Arc<UserStore>,
}

impl SessionContext {
    /// Build the client and store over `storage` and install the default
    /// special code handlers.
    pub fn new(
        config: &ClientConfig,
        storage: SharedStorage,
        router: Arc<dyn Router>,
    ) -> Result<Self, SessionError> {
        let registry = Arc::new(SpecialCodeRegistry::new());
        let client = ApiClient::builder()
            .config(config)
            .storage(storage)
            .registry(registry.clone())
            .build()?;

        let store = Arc::new(UserStore::new(
            client.clone(),
            router,
            NavigationPaths::from(config),
        ));
        install_default_handlers(&registry, &store);
        debug!(?registry, "Session context ready");

        Ok(Self {
            client,
            registry,
            store,
        })
    }

    /// Same as [`SessionContext::new`] with file storage at
    /// `config.storage_path`
    pub fn from_config(config: &ClientConfig, router: Arc<dyn Router>) -> Result<Self, SessionError> {
        let storage = FileStorage::open(&config.storage_path)?;
        Self::new(config, Arc::new(storage), router)
    }
}
