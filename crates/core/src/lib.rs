//! Portico core types and utilities

pub mod config;
pub mod envelope;
pub mod error;
pub mod storage;
pub mod user;

pub use config::ClientConfig;
pub use envelope::{ApiResponse, ResultCode};
pub use error::{CoreError, CoreResult};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SharedStorage};
pub use user::{DEFAULT_TOKEN_NAME, TOKEN_KEY, TOKEN_NAME_KEY, UserInfo, UserProfile};
