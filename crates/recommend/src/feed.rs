//! arXiv Atom feed access and parsing
//!
//! The transport is a trait so tests can count calls and serve canned
//! feeds; production uses reqwest against the public query API with the
//! query URL-escaped.

use async_trait::async_trait;
use paperlens_common::config::RecommendConfig;
use paperlens_common::errors::{PipelineError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One matched external paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Paper title
    pub title: String,

    /// Author names in feed order
    pub authors: Vec<String>,

    /// Canonical paper URL
    pub url: String,
}

/// Fetches a raw feed document for a query
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn fetch(&self, query: &str, max_results: usize) -> Result<String>;
}

/// HTTP transport against the arXiv query API
pub struct HttpFeedTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeedTransport {
    /// Create a transport from configuration
    pub fn new(config: &RecommendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Configuration {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl FeedTransport for HttpFeedTransport {
    async fn fetch(&self, query: &str, max_results: usize) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", format!("all:{}", query)),
                ("start", "0".to_string()),
                ("max_results", max_results.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Upstream {
                status,
                message: body.chars().take(500).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

#[derive(Default)]
struct PendingEntry {
    title: String,
    authors: Vec<String>,
    author_name: String,
    id: String,
}

enum Field {
    Title,
    AuthorName,
    Id,
}

/// Parse an Atom feed into recommendations, at most `max_results`
pub fn parse_feed(xml: &str, max_results: usize) -> Result<Vec<Recommendation>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();
    let mut entry: Option<PendingEntry> = None;
    let mut in_author = false;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event().map_err(|e| PipelineError::UnusableOutput {
            message: format!("feed parse error: {}", e),
        })? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"entry" => entry = Some(PendingEntry::default()),
                b"author" if entry.is_some() => in_author = true,
                b"name" if in_author => field = Some(Field::AuthorName),
                // The feed itself carries a top-level <title>; only
                // capture fields inside an entry
                b"title" if entry.is_some() => field = Some(Field::Title),
                b"id" if entry.is_some() => field = Some(Field::Id),
                _ => {}
            },
            Event::Text(t) => {
                if let (Some(pending), Some(f)) = (entry.as_mut(), field.as_ref()) {
                    let text = t.unescape().map_err(|e| PipelineError::UnusableOutput {
                        message: format!("feed text decode error: {}", e),
                    })?;
                    let target = match f {
                        Field::Title => &mut pending.title,
                        Field::AuthorName => &mut pending.author_name,
                        Field::Id => &mut pending.id,
                    };
                    if !target.is_empty() {
                        target.push(' ');
                    }
                    target.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(pending) = entry.take() {
                        if !pending.title.is_empty() && !pending.id.is_empty() {
                            papers.push(Recommendation {
                                title: collapse_whitespace(&pending.title),
                                authors: pending.authors,
                                url: pending.id.trim().to_string(),
                            });
                            if papers.len() >= max_results {
                                break;
                            }
                        }
                    }
                }
                b"author" => {
                    in_author = false;
                    if let Some(pending) = entry.as_mut() {
                        let name = collapse_whitespace(&pending.author_name);
                        if !name.is_empty() {
                            pending.authors.push(name);
                        }
                        pending.author_name.clear();
                    }
                }
                b"title" | b"name" | b"id" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(count = papers.len(), "Feed parsed");
    Ok(papers)
}

/// arXiv titles span lines with leading indentation
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
