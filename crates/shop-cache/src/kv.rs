//! Key-Value store wrapper with automatic serialization.

use std::path::Path;
use std::sync::Arc;

use crate::store::{FileStore, MemoryStore};
use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// A string-to-string key-value backend.
///
/// Implementations must be safe to share between tasks; every call is
/// expected to complete without blocking on the network.
pub trait KvStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a raw value under `key`, replacing any previous value.
    fn set_raw(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// List all keys currently stored.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Type-safe cache over any [`KvStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`, plus raw string access for values
/// that are persisted verbatim (the auth token).
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KvStore>,
}

impl Cache {
    /// Wrap an existing backend.
    pub fn new(store: impl KvStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// A cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open (or create) a file-backed cache.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open("session.json")?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::new(FileStore::open(path)?))
    }

    /// Get a JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Set a JSON value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.store.set_raw(key, &raw)
    }

    /// Get a raw string value.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.store.get_raw(key)
    }

    /// Set a raw string value.
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.store.set_raw(key, value)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.store.get_raw(key)?.is_some())
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Profile {
        id: i64,
        username: String,
    }

    #[test]
    fn test_json_round_trip() {
        let cache = Cache::in_memory();
        let profile = Profile {
            id: 7,
            username: "alice".to_string(),
        };
        cache.set("userInfo", &profile).unwrap();
        let loaded: Option<Profile> = cache.get("userInfo").unwrap();
        assert_eq!(loaded, Some(profile));
    }

    #[test]
    fn test_raw_values_are_not_quoted() {
        let cache = Cache::in_memory();
        cache.set_raw("token", "abc.def.ghi").unwrap();
        assert_eq!(cache.get_raw("token").unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_key() {
        let cache = Cache::in_memory();
        let value: Option<Profile> = cache.get("nope").unwrap();
        assert!(value.is_none());
        assert!(!cache.exists("nope").unwrap());
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let cache = Cache::in_memory();
        cache.set_raw("userInfo", "{not json").unwrap();
        let result: Result<Option<Profile>, _> = cache.get("userInfo");
        assert!(matches!(result, Err(CacheError::SerializeError(_))));
    }

    #[test]
    fn test_delete() {
        let cache = Cache::in_memory();
        cache.set_raw("token", "t").unwrap();
        cache.delete("token").unwrap();
        assert!(!cache.exists("token").unwrap());
        // deleting again is fine
        cache.delete("token").unwrap();
    }

    #[test]
    fn test_clones_share_backend() {
        let cache = Cache::in_memory();
        let other = cache.clone();
        cache.set_raw("k", "v").unwrap();
        assert_eq!(other.get_raw("k").unwrap().as_deref(), Some("v"));
    }
}
