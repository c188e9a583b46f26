//! Key-value persistence for reader preferences

use ahash::AHashMap;
use parking_lot::RwLock;

/// Persistent string key-value storage (browser-local-storage style).
///
/// Implementations must tolerate unknown keys; `get` never fails.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Write pending changes to the backing medium
    fn flush(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// In-memory store, used in tests and when no preferences file is configured
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<AHashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values.write().insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
