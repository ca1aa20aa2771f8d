//! External query stores
//!
//! A `QueryStore` is the key-value surface the synchronizer writes into,
//! usually the query string of the address bar. Stores are shared handles:
//! several collections may mirror into the same one.

use crate::error::Result;
use crate::types::{query_values, JsonValue};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use url::Url;

/// Key-value store mirrored by `QueryParamSynchronizer`
pub trait QueryStore: Send + 'static {
    /// Read one key
    fn get(&self, key: &str) -> Option<JsonValue>;

    /// Write one key; `None` removes it
    fn set(&self, key: &str, value: Option<JsonValue>);

    /// Snapshot of every key
    fn get_all(&self) -> BTreeMap<String, JsonValue>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory store keeping values with their JSON types
#[derive(Debug, Clone, Default)]
pub struct MemoryQueryStore {
    inner: Arc<RwLock<BTreeMap<String, JsonValue>>>,
}

impl MemoryQueryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in the store
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueryStore for MemoryQueryStore {
    fn get(&self, key: &str) -> Option<JsonValue> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Option<JsonValue>) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match value {
            Some(value) if !value.is_null() => {
                map.insert(key.to_string(), value);
            }
            _ => {
                map.remove(key);
            }
        }
    }

    fn get_all(&self) -> BTreeMap<String, JsonValue> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ============================================================================
// URL store
// ============================================================================

/// Store backed by the query string of a URL.
///
/// Values are written the way they are sent in a request: as text, with
/// arrays expanded to repeated keys. They read back as JSON strings, or
/// arrays of strings for repeated keys. Replacing a key keeps its position.
#[derive(Debug, Clone)]
pub struct UrlQueryStore {
    url: Arc<RwLock<Url>>,
}

impl UrlQueryStore {
    /// Wrap an existing URL
    pub fn new(url: Url) -> Self {
        Self {
            url: Arc::new(RwLock::new(url)),
        }
    }

    /// Parse and wrap a URL
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Current URL
    pub fn url(&self) -> Url {
        self.url.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

impl QueryStore for UrlQueryStore {
    fn get(&self, key: &str) -> Option<JsonValue> {
        let url = self.url.read().unwrap_or_else(PoisonError::into_inner);
        let values: Vec<String> = Self::pairs(&url)
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect();
        collapse(values)
    }

    fn set(&self, key: &str, value: Option<JsonValue>) {
        let mut url = self.url.write().unwrap_or_else(PoisonError::into_inner);
        let mut pairs = Self::pairs(&url);
        let texts = value.as_ref().map(query_values).unwrap_or_default();

        // new values take the place of the first existing occurrence
        let at = pairs.iter().position(|(k, _)| k == key);
        pairs.retain(|(k, _)| k != key);
        let at = at.unwrap_or(pairs.len());
        pairs.splice(at..at, texts.into_iter().map(|text| (key.to_string(), text)));

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }

    fn get_all(&self) -> BTreeMap<String, JsonValue> {
        let url = self.url.read().unwrap_or_else(PoisonError::into_inner);
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in Self::pairs(&url) {
            grouped.entry(key).or_default().push(value);
        }
        grouped
            .into_iter()
            .filter_map(|(key, values)| Some((key, collapse(values)?)))
            .collect()
    }
}

/// One value reads back as a string, repeated keys as an array of strings
fn collapse(mut values: Vec<String>) -> Option<JsonValue> {
    match values.len() {
        0 => None,
        1 => values.pop().map(JsonValue::String),
        _ => Some(JsonValue::Array(
            values.into_iter().map(JsonValue::String).collect(),
        )),
    }
}
