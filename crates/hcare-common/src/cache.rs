//! Content-addressed cache.
//!
//! Entries are keyed by a SHA-256 [`Fingerprint`] of the inputs that produced
//! them, so a changed input can never be served a stale value. Invalidation is
//! explicit: callers drop a single key or clear the whole cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

/// SHA-256 digest of some input content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut fp = FingerprintBuilder::new();
        fp.update_bytes(bytes);
        fp.finish()
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Incremental fingerprint. Every field is length- or tag-prefixed so
/// adjacent fields cannot run together.
#[derive(Clone, Default)]
pub struct FingerprintBuilder {
    hasher: Sha256,
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    pub fn update_str(&mut self, s: &str) {
        self.update_bytes(s.as_bytes());
    }

    pub fn update_strs(&mut self, items: &[String]) {
        self.update_usize(items.len());
        for item in items {
            self.update_str(item);
        }
    }

    pub fn update_usize(&mut self, n: usize) {
        self.hasher.update((n as u64).to_le_bytes());
    }

    pub fn update_i64(&mut self, n: i64) {
        self.hasher.update(n.to_le_bytes());
    }

    pub fn update_opt_f64(&mut self, value: Option<f64>) {
        match value {
            Some(v) => {
                self.hasher.update([1u8]);
                self.hasher.update(v.to_bits().to_le_bytes());
            }
            None => self.hasher.update([0u8]),
        }
    }

    pub fn finish(self) -> Fingerprint {
        let digest = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Fingerprint(bytes)
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: Arc<V>,
    inserted_at: DateTime<Utc>,
}

/// Map from input fingerprint to a shared, immutable computed value.
#[derive(Debug)]
pub struct FingerprintCache<V> {
    entries: HashMap<Fingerprint, CacheEntry<V>>,
}

impl<V> Default for FingerprintCache<V> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<V> FingerprintCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Fingerprint) -> Option<Arc<V>> {
        self.entries.get(key).map(|e| Arc::clone(&e.value))
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.entries.contains_key(key)
    }

    /// When the entry for `key` was stored.
    pub fn inserted_at(&self, key: &Fingerprint) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|e| e.inserted_at)
    }

    pub fn insert(&mut self, key: Fingerprint, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.insert(
            key,
            CacheEntry {
                value: Arc::clone(&value),
                inserted_at: Utc::now(),
            },
        );
        value
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    /// A failed computation stores nothing.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: Fingerprint, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            debug!(key = ?key, "cache hit");
            return Ok(hit);
        }
        debug!(key = ?key, "cache miss");
        let value = compute()?;
        Ok(self.insert(key, value))
    }

    /// Drop one entry. Returns whether it existed.
    pub fn invalidate(&mut self, key: &Fingerprint) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
