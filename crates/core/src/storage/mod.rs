//! Durable key-value storage for session credentials

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::CoreResult;
use std::sync::Arc;

/// Storage handle shared between the HTTP client and the session store
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// String key-value store with the semantics of browser local storage.
///
/// Reads never fail: an unreadable or missing entry is `None`.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> CoreResult<()>;

    fn remove_item(&self, key: &str) -> CoreResult<()>;

    /// Write several entries. Backends that can persist a batch as one unit
    /// override this so either all entries land or none do.
    fn set_items(&self, items: &[(&str, &str)]) -> CoreResult<()> {
        for (key, value) in items {
            self.set_item(key, value)?;
        }
        Ok(())
    }

    /// Remove several entries
    fn remove_items(&self, keys: &[&str]) -> CoreResult<()> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }
}
