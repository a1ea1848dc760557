//! Session error types

use portico_core::CoreError;
use portico_http::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend call failed; displays as the underlying client error
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Credentials could not be written to storage
    #[error("Failed to persist credentials: {0}")]
    Storage(#[from] CoreError),

    /// The router rejected a navigation
    #[error("Navigation failed: {0}")]
    Navigation(String),
}

impl SessionError {
    pub fn navigation(error: &anyhow::Error) -> Self {
        Self::Navigation(format!("{error:#}"))
    }
}
