//! Client configuration

use crate::{CoreError, CoreResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Settings shared by the HTTP client and the session store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://admin.example.com/api`
    pub base_url: String,

    /// Request timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// File holding the persisted token pair
    pub storage_path: PathBuf,

    /// Navigation target after login when no redirect was requested
    pub home_path: String,

    /// Login route used for auth-failure redirects
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            user_agent: concat!("portico/", env!("CARGO_PKG_VERSION")).to_string(),
            storage_path: default_storage_path(),
            home_path: "/".to_string(),
            login_path: "/login".to_string(),
        }
    }
}

/// Platform data directory for the session file
pub fn default_storage_path() -> PathBuf {
    match ProjectDirs::from("dev", "Portico", "portico") {
        Some(dirs) => dirs.data_dir().join("session.json"),
        None => {
            warn!("Failed to determine platform-specific directories, using current directory");
            PathBuf::from("./portico/session.json")
        }
    }
}

/// `PORTICO_*` variables; `__` separates nested keys
fn environment() -> config::Environment {
    config::Environment::with_prefix("PORTICO")
        .prefix_separator("_")
        .separator("__")
}

impl ClientConfig {
    /// Load configuration from a file layered over defaults and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default(
                "storage_path",
                defaults.storage_path.to_string_lossy().to_string(),
            )?
            .set_default("home_path", defaults.home_path)?
            .set_default("login_path", defaults.login_path)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(environment())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that cannot be caught by deserialization
    pub fn validate(&self) -> CoreResult<()> {
        let base_url = url::Url::parse(&self.base_url)
            .map_err(|e| CoreError::invalid_config(format!("base_url {}: {e}", self.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CoreError::invalid_config(format!(
                "base_url must be http or https, got {}",
                base_url.scheme()
            )));
        }

        for (field, value) in [("home_path", &self.home_path), ("login_path", &self.login_path)] {
            if !value.starts_with('/') {
                return Err(CoreError::invalid_config(format!(
                    "{field} must be an absolute path, got {value:?}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.home_path, "/");
        assert_eq!(config.login_path, "/login");
        assert!(config.storage_path.ends_with("session.json"));
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portico.toml");
        std::fs::write(
            &path,
            r#"
base_url = "https://admin.example.com/api"
timeout_secs = 5
login_path = "/auth/login"
"#,
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.base_url, "https://admin.example.com/api");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.login_path, "/auth/login");
        assert_eq!(config.home_path, "/");
    }

    #[test]
    fn test_environment_keys() {
        let vars = [
            ("PORTICO_BASE_URL", "https://env.example.com"),
            ("PORTICO_LOGIN_PATH", "/sign-in"),
            ("PORTICO_TIMEOUT_SECS", "7"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let settings = config::Config::builder()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap();

        assert_eq!(
            settings.get_string("base_url").unwrap(),
            "https://env.example.com"
        );
        assert_eq!(settings.get_string("login_path").unwrap(), "/sign-in");
        assert_eq!(settings.get_int("timeout_secs").unwrap(), 7);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ClientConfig {
            base_url: "ftp://example.com".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig { .. })
        ));

        let config = ClientConfig {
            login_path: "login".to_string(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
