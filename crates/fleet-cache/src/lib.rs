//! Artefact cache: a concurrent `String -> String` store shared between
//! step actions, used to hand off inter-step outputs (for example
//! `closure:<host-name> -> <store-path>` written by a build step and read
//! by the push step that follows it).

use std::collections::HashMap;

use parking_lot::RwLock;

/// Returned by [`ArtefactCache::get`] when the key has never been written.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("cache miss for key `{key}`")]
pub struct CacheMiss {
    pub key: String,
}

/// A concurrent keyed store. All operations are sequentially consistent:
/// readers never observe a torn map, and every mutator takes the single
/// internal lock for the shortest span that correctness allows.
///
/// The `identifier` is attached only for log attribution — it plays no
/// role in the store's semantics.
pub struct ArtefactCache {
    identifier: String,
    data: RwLock<HashMap<String, String>>,
}

impl ArtefactCache {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite `key`. Last writer wins.
    pub fn update(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        tracing::debug!(store = %self.identifier, %key, %value, "cache write");
        self.data.write().insert(key, value);
    }

    /// Fetch `key`, failing with [`CacheMiss`] when absent.
    pub fn get(&self, key: &str) -> Result<String, CacheMiss> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| CacheMiss { key: key.to_string() })
    }

    /// Atomic read-or-install: the first caller to observe a missing key
    /// installs `default` and every caller (including the installer)
    /// observes the same stored value afterwards.
    pub fn get_or_set(&self, key: impl Into<String>, default: impl Into<String>) -> String {
        let key = key.into();
        let mut guard = self.data.write();
        if let Some(existing) = guard.get(&key) {
            tracing::debug!(store = %self.identifier, %key, "cache get-or-set: key exists");
            return existing.clone();
        }
        let value = default.into();
        tracing::debug!(store = %self.identifier, %key, %value, "cache get-or-set: key missing, installed");
        guard.insert(key, value.clone());
        value
    }

    /// Atomic read-modify-write: `f` is applied to the current value (or
    /// `default` if absent) and the result is stored. Used for counters,
    /// notably the scheduler's per-step retry count.
    pub fn update_fn(
        &self,
        key: impl Into<String>,
        default: impl Into<String>,
        f: impl FnOnce(String) -> String,
    ) {
        let key = key.into();
        let mut guard = self.data.write();
        let current = guard.get(&key).cloned().unwrap_or_else(|| default.into());
        let new_value = f(current);
        tracing::debug!(store = %self.identifier, %key, value = %new_value, "cache update_fn");
        guard.insert(key, new_value);
    }

    /// An independent copy of the current map, safe to iterate without
    /// holding the store's lock.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.data.read().clone()
    }
}
