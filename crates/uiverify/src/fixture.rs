//! Fixture data seeded into the application's persisted storage.
//!
//! A fixture is an opaque JSON value. The runner never inspects its schema;
//! it serializes it, writes it under the configured localStorage key and
//! reloads the page. The reload is required because the target application
//! only reads storage during initialization.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::result::{VerifyError, VerifyResult};
use crate::selector::js_string;

/// Snapshot of application state injected before a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixture(serde_json::Value);

impl Fixture {
    /// Wrap an existing JSON value
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Build a fixture from any serializable value
    pub fn from_serializable<T: Serialize>(value: &T) -> VerifyResult<Self> {
        serde_json::to_value(value)
            .map(Self)
            .map_err(VerifyError::seed)
    }

    /// Load a fixture file (`.yaml`/`.yml` as YAML, anything else as JSON)
    pub fn from_path(path: impl AsRef<Path>) -> VerifyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        let value = if is_yaml {
            serde_yaml_ng::from_str(&text).map_err(|e| {
                VerifyError::scenario(format!("fixture {}: {e}", path.display()))
            })?
        } else {
            serde_json::from_str(&text).map_err(|e| {
                VerifyError::scenario(format!("fixture {}: {e}", path.display()))
            })?
        };
        Ok(Self(value))
    }

    /// The wrapped value
    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Names of the top-level collections, in key order
    #[must_use]
    pub fn collections(&self) -> Vec<&str> {
        match &self.0 {
            serde_json::Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Prepare the storage write for this fixture
    pub fn seed(&self, key: &str, clear_first: bool) -> VerifyResult<StorageSeed> {
        let payload = serde_json::to_string(&self.0).map_err(VerifyError::seed)?;
        Ok(StorageSeed {
            key: key.to_string(),
            payload,
            clear_first,
        })
    }
}

impl From<serde_json::Value> for Fixture {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// A pending localStorage write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSeed {
    /// localStorage key
    pub key: String,
    /// Serialized fixture
    pub payload: String,
    /// Whether storage is cleared first
    pub clear_first: bool,
}

impl StorageSeed {
    /// Script performing the write; evaluates to `true` when the stored
    /// value reads back identical to the payload
    #[must_use]
    pub fn to_script(&self) -> String {
        let clear = if self.clear_first {
            "window.localStorage.clear(); "
        } else {
            ""
        };
        format!(
            "(() => {{ {clear}const payload = {payload}; \
             window.localStorage.setItem({key}, payload); \
             return window.localStorage.getItem({key}) === payload; }})()",
            key = js_string(&self.key),
            payload = js_string(&self.payload),
        )
    }
}
