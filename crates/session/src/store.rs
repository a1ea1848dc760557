//! Signed-in user state

use crate::api::{LoginPayload, LoginResult, UserApi};
use crate::error::SessionError;
use crate::router::{Location, Router};
use portico_core::{ClientConfig, SharedStorage, TOKEN_KEY, TOKEN_NAME_KEY, UserInfo};
use portico_http::ApiClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info, warn};

/// Query parameter carrying the post-login target
pub const REDIRECT_PARAM: &str = "redirect";

/// Where the store sends the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPaths {
    pub home: String,
    pub login: String,
}

impl Default for NavigationPaths {
    fn default() -> Self {
        Self {
            home: "/".to_string(),
            login: "/login".to_string(),
        }
    }
}

impl From<&ClientConfig> for NavigationPaths {
    fn from(config: &ClientConfig) -> Self {
        Self {
            home: config.home_path.clone(),
            login: config.login_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

/// Clears the loading flag however the login attempt ends
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Holds the current user and drives login and logout.
///
/// Concurrent `login`/`logout` calls are not serialized against each other;
/// whichever writes last decides the stored token.
pub struct UserStore {
    api: UserApi,
    storage: SharedStorage,
    router: Arc<dyn Router>,
    paths: NavigationPaths,
    user: RwLock<UserInfo>,
    routes: RwLock<Vec<String>>,
    loading: AtomicBool,
}

impl UserStore {
    /// Create a store, restoring the token pair from the client's storage
    pub fn new(client: ApiClient, router: Arc<dyn Router>, paths: NavigationPaths) -> Self {
        let storage = client.storage().clone();
        let user = UserInfo::from_credentials(
            storage.get_item(TOKEN_KEY),
            storage.get_item(TOKEN_NAME_KEY),
        );

        Self {
            api: UserApi::new(client),
            storage,
            router,
            paths,
            user: RwLock::new(user),
            routes: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current user
    pub fn user(&self) -> UserInfo {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a login is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .has_token()
    }

    pub fn state(&self) -> SessionState {
        if self.is_loading() {
            SessionState::LoggingIn
        } else if self.is_authenticated() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    /// Route paths granted to the current role
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_routes(&self, routes: Vec<String>) {
        *self.routes.write().unwrap_or_else(PoisonError::into_inner) = routes;
    }

    /// Log in, persist the issued token, load the profile and navigate to
    /// the requested redirect target (home by default).
    ///
    /// A token stored before a later step fails stays in place.
    pub async fn login(&self, payload: &LoginPayload) -> Result<UserInfo, SessionError> {
        let _loading = LoadingGuard::start(&self.loading);
        info!(username = %payload.username, "Logging in");

        let LoginResult {
            token_value,
            token_name,
        } = self.api.login(payload).await?;

        {
            let mut user = self.user.write().unwrap_or_else(PoisonError::into_inner);
            user.token = token_value.clone();
            user.token_name = token_name.clone();
        }
        self.storage.set_items(&[
            (TOKEN_KEY, token_value.as_str()),
            (TOKEN_NAME_KEY, token_name.as_str()),
        ])?;

        let info = self.fetch_update_user_info().await;

        let redirect = self
            .router
            .query_param(REDIRECT_PARAM)
            .filter(|target| !target.is_empty())
            .unwrap_or_else(|| self.paths.home.clone());
        self.router
            .push(Location::parse(&redirect))
            .await
            .map_err(|e| SessionError::navigation(&e))?;

        info!(user = %info.name, "Logged in");
        Ok(info)
    }

    /// Merge the server profile into the current user.
    ///
    /// A failed fetch ends the session; the returned user is then the
    /// logged-out default.
    pub async fn fetch_update_user_info(&self) -> UserInfo {
        match self.api.query_user_info().await {
            Ok(profile) => {
                let mut user = self.user.write().unwrap_or_else(PoisonError::into_inner);
                user.merge(profile);
                user.clone()
            }
            Err(e) => {
                error!("Failed to fetch user info: {e}");
                self.logout();
                self.user()
            }
        }
    }

    /// Drop the local session: reset the user and remove the stored token pair
    pub fn logout(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = UserInfo::default();

        if let Err(e) = self.storage.remove_items(&[TOKEN_KEY, TOKEN_NAME_KEY]) {
            error!("Failed to remove stored credentials: {e}");
        }
        info!("Local session cleared");
    }

    /// Tell the server, clear the local session, and go to the login route
    /// with `redirect` set to `redirect` or the current location.
    ///
    /// The server call is best effort; local cleanup and navigation happen
    /// regardless of its outcome.
    pub async fn logout_with_query_redirect(
        &self,
        redirect: Option<&str>,
    ) -> Result<(), SessionError> {
        if let Err(e) = self.api.logout().await {
            warn!("Logout request failed: {e}");
        }

        self.logout();

        let redirect = redirect
            .map(str::to_string)
            .unwrap_or_else(|| self.router.current_full_path());
        let location = Location::new(self.paths.login.clone()).with_query(REDIRECT_PARAM, redirect);

        self.router
            .push(location)
            .await
            .map_err(|e| SessionError::navigation(&e))
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("state", &self.state())
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::HistoryRouter;
    use portico_core::{KeyValueStorage, MemoryStorage};

    fn store_with(storage: Arc<MemoryStorage>) -> UserStore {
        let client = ApiClient::builder()
            .base_url("http://127.0.0.1:9")
            .storage(storage)
            .build()
            .unwrap();
        UserStore::new(client, Arc::new(HistoryRouter::new()), NavigationPaths::default())
    }

    #[test]
    fn test_restores_credentials_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_items(&[(TOKEN_KEY, "abc"), (TOKEN_NAME_KEY, "X-Token")])
            .unwrap();

        let store = store_with(storage);
        let user = store.user();
        assert_eq!(user.token, "abc");
        assert_eq!(user.token_name, "X-Token");
        assert!(user.name.is_empty());
        assert_eq!(store.state(), SessionState::LoggedIn);
    }

    #[test]
    fn test_logout_resets_user_and_storage() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_items(&[(TOKEN_KEY, "abc"), (TOKEN_NAME_KEY, "X-Token"), ("theme", "dark")])
            .unwrap();

        let store = store_with(storage.clone());
        store.logout();

        assert_eq!(store.user(), UserInfo::default());
        assert_eq!(store.state(), SessionState::LoggedOut);
        assert!(storage.get_item(TOKEN_KEY).is_none());
        assert!(storage.get_item(TOKEN_NAME_KEY).is_none());
        assert_eq!(storage.get_item("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_loading_guard_clears_flag() {
        let flag = AtomicBool::new(false);
        {
            let _guard = LoadingGuard::start(&flag);
            assert!(flag.load(Ordering::SeqCst));
        }
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_routes_are_stored() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        assert!(store.routes().is_empty());
        store.set_routes(vec!["/orders".to_string(), "/reports".to_string()]);
        assert_eq!(store.routes().len(), 2);
    }
}
