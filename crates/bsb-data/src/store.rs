//! Preferences persisted to a JSON file

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bsb_core::PreferenceStore;
use parking_lot::RwLock;

use crate::DataError;

/// String key-value store backed by a JSON object on disk.
///
/// Every `set` writes through, so values survive an unclean exit.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonPreferenceStore {
    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// one is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Ignoring preferences at {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        tracing::debug!("Opened {} preferences from {}", values.len(), path.display());
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<BTreeMap<String, String>, DataError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), DataError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.write(&values)?;
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        self.write(&self.values.read())?;
        Ok(())
    }
}
