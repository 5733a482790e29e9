//! Recommendation client with query-signature caching
//!
//! Identical query text within the TTL window is served from the cache
//! without touching the transport; any transport or parse failure
//! degrades to an empty result list plus a warning message.

use crate::feed::{parse_feed, FeedTransport, HttpFeedTransport, Recommendation};
use paperlens_common::cache::{query_signature, Cache, CacheConfig};
use paperlens_common::config::RecommendConfig;
use paperlens_common::errors::Result;
use std::sync::Arc;
use tracing::{debug, error};

/// Result of a recommendation query
///
/// `papers` is empty on no match or on failure; `warning` carries the
/// human-readable message when a failure was absorbed.
#[derive(Debug, Clone)]
pub struct Recommendations {
    pub papers: Vec<Recommendation>,
    pub warning: Option<String>,
}

/// Related-paper search client
pub struct RecommendClient {
    transport: Arc<dyn FeedTransport>,
    cache: Cache,
    config: RecommendConfig,
}

impl RecommendClient {
    /// Create a client backed by the HTTP transport
    pub fn new(config: RecommendConfig) -> Result<Self> {
        let transport = Arc::new(HttpFeedTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: RecommendConfig, transport: Arc<dyn FeedTransport>) -> Self {
        let cache = Cache::new(CacheConfig {
            default_ttl_secs: config.cache_ttl_secs,
            key_prefix: "recommend".to_string(),
        });
        Self {
            transport,
            cache,
            config,
        }
    }

    /// Recommend related papers for a text snippet
    ///
    /// Never faults: failures are absorbed into an empty result list
    /// with a warning message.
    pub async fn recommend(&self, query_text: &str) -> Recommendations {
        let key = query_signature(query_text);

        // A cache read failure is just a miss
        if let Ok(Some(papers)) = self.cache.get::<Vec<Recommendation>>(&key).await {
            debug!(results = papers.len(), "Recommendations served from cache");
            return Recommendations {
                papers,
                warning: None,
            };
        }

        match self.fetch(query_text).await {
            Ok(papers) => {
                if let Err(e) = self
                    .cache
                    .set_with_ttl(&key, &papers, self.config.cache_ttl_secs)
                    .await
                {
                    tracing::warn!(error = %e, "Failed to cache recommendations");
                }
                Recommendations {
                    papers,
                    warning: None,
                }
            }
            Err(e) => {
                error!(error = %e, "Recommendation lookup failed");
                Recommendations {
                    papers: Vec::new(),
                    warning: Some(format!(
                        "Could not fetch recommendations from the paper search service: {}",
                        e
                    )),
                }
            }
        }
    }

    async fn fetch(&self, query_text: &str) -> Result<Vec<Recommendation>> {
        let xml = self
            .transport
            .fetch(query_text, self.config.max_results)
            .await?;
        parse_feed(&xml, self.config.max_results)
    }
}
