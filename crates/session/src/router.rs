//! Navigation collaborator

use async_trait::async_trait;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use tracing::info;
use url::form_urlencoded;

/// A route path with its query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// First value of the query parameter `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse a full path such as `/login?redirect=%2Forders`
    pub fn parse(full_path: &str) -> Self {
        let without_fragment = full_path.split('#').next().unwrap_or_default();
        match without_fragment.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect(),
            },
            None => Self::new(without_fragment),
        }
    }

    /// Path plus encoded query string
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        format!("{}?{query}", self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

impl From<&str> for Location {
    fn from(full_path: &str) -> Self {
        Self::parse(full_path)
    }
}

/// Where the application currently is, and how to move elsewhere
#[async_trait]
pub trait Router: Send + Sync {
    /// Path and query of the current location
    fn current_full_path(&self) -> String;

    /// Query parameter of the current location
    fn query_param(&self, key: &str) -> Option<String>;

    /// Navigate to `location`
    async fn push(&self, location: Location) -> anyhow::Result<()>;
}

/// In-memory router that records every navigation.
///
/// History is never pruned; meant for short-lived processes such as the CLI
/// and for tests.
#[derive(Debug)]
pub struct HistoryRouter {
    entries: RwLock<Vec<Location>>,
}

impl Default for HistoryRouter {
    fn default() -> Self {
        Self::starting_at("/")
    }
}

impl HistoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router whose current location is `full_path`
    pub fn starting_at(full_path: &str) -> Self {
        Self {
            entries: RwLock::new(vec![Location::parse(full_path)]),
        }
    }

    pub fn current(&self) -> Location {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_default()
    }

    /// Every location visited, oldest first
    pub fn history(&self) -> Vec<Location> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Router for HistoryRouter {
    fn current_full_path(&self) -> String {
        self.current().full_path()
    }

    fn query_param(&self, key: &str) -> Option<String> {
        self.current().query_value(key).map(str::to_string)
    }

    async fn push(&self, location: Location) -> anyhow::Result<()> {
        info!("Navigating to {location}");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_encode() {
        let location = Location::parse("/login?redirect=%2Forders%3Fpage%3D2&x=1");
        assert_eq!(location.path, "/login");
        assert_eq!(location.query_value("redirect"), Some("/orders?page=2"));
        assert_eq!(location.query_value("x"), Some("1"));
        assert_eq!(location.query_value("missing"), None);

        let encoded = Location::new("/login")
            .with_query("redirect", "/orders?page=2")
            .full_path();
        assert_eq!(encoded, "/login?redirect=%2Forders%3Fpage%3D2");
        assert_eq!(Location::parse(&encoded).query_value("redirect"), Some("/orders?page=2"));
    }

    #[test]
    fn test_plain_path() {
        let location = Location::parse("/dashboard#top");
        assert_eq!(location, Location::new("/dashboard"));
        assert_eq!(location.to_string(), "/dashboard");
    }

    #[tokio::test]
    async fn test_history_router_tracks_current_location() {
        let router = HistoryRouter::starting_at("/login?redirect=%2Freports");
        assert_eq!(router.query_param("redirect").as_deref(), Some("/reports"));

        router.push(Location::new("/reports")).await.unwrap();
        assert_eq!(router.current_full_path(), "/reports");
        assert_eq!(router.query_param("redirect"), None);
        assert_eq!(router.history().len(), 2);
    }
}
