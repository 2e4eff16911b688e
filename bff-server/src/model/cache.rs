//! Keyed in-memory store with TTL semantics

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// In-memory keyed store where every entry expires after the configured TTL.
///
/// Expiry is lazy: an entry past its deadline is dropped the next time it is
/// read, there is no sweeper task. The store is owned by the model and handed
/// to the components that need it, so tests can construct their own with any
/// TTL they like.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates a store whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a value under the key, replacing any previous entry.
    ///
    /// Returns the instant the entry expires at.
    pub async fn put(&self, key: K, value: V) -> DateTime<Utc> {
        let expires_at = Utc::now() + self.ttl;
        self.entries
            .write()
            .await
            .insert(key, Entry { value, expires_at });
        expires_at
    }

    /// Returns the value for the key, or nothing if it is absent or expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Utc::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Removes the entry for the key, returning its value if it was still live
    pub async fn remove(&self, key: &K) -> Option<V> {
        let entry = self.entries.write().await.remove(key)?;
        (entry.expires_at > Utc::now()).then_some(entry.value)
    }
}
