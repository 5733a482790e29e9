//! In-process TTL cache
//!
//! Provides:
//! - Generic get/set operations with TTL
//! - Query-signature key derivation
//! - Get-or-load with a loader function
//!
//! Values are stored as JSON so cached types only need serde. Expiry
//! uses the tokio clock, which tests can pause and advance.

use crate::errors::{PipelineError, Result};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default TTL in seconds
    pub default_ttl_secs: u64,
    /// Key prefix for namespacing
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 3600,
            key_prefix: "paperlens".to_string(),
        }
    }
}

struct Entry {
    expires_at: Instant,
    json: String,
}

/// In-process cache with per-entry TTL
pub struct Cache {
    entries: RwLock<HashMap<String, Entry>>,
    config: CacheConfig,
}

impl Cache {
    /// Create a new cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Build a prefixed key
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }

    /// Get a value from cache, ignoring expired entries
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.key(key);
        let entries = self.entries.read().await;

        match entries.get(&full_key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                let parsed =
                    serde_json::from_str(&entry.json).map_err(|e| PipelineError::Cache {
                        message: format!("failed to parse cached value: {}", e),
                    })?;
                debug!(key = %full_key, "Cache hit");
                Ok(Some(parsed))
            }
            _ => {
                debug!(key = %full_key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Set a value in cache with default TTL
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_with_ttl(key, value, self.config.default_ttl_secs)
            .await
    }

    /// Set a value in cache with custom TTL
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) -> Result<()> {
        let full_key = self.key(key);
        let json = serde_json::to_string(value).map_err(|e| PipelineError::Cache {
            message: format!("failed to serialize value: {}", e),
        })?;

        let mut entries = self.entries.write().await;
        entries.insert(
            full_key.clone(),
            Entry {
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
                json,
            },
        );

        debug!(key = %full_key, ttl_secs, "Cache set");
        Ok(())
    }

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let full_key = self.key(key);
        let mut entries = self.entries.write().await;
        Ok(entries.remove(&full_key).is_some())
    }

    /// Drop all expired entries
    pub async fn purge_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Get or set with a loader function
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, ttl_secs: u64, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get::<T>(key).await? {
            return Ok(cached);
        }

        let value = loader().await?;

        if let Err(e) = self.set_with_ttl(key, &value, ttl_secs).await {
            tracing::warn!(error = %e, "Failed to cache value, continuing without cache");
        }

        Ok(value)
    }
}

/// Derive a stable cache key from exact query text
pub fn query_signature(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
