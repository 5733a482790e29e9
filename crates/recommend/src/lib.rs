//! PaperLens Recommendation Library
//!
//! Queries a public bibliographic search API (arXiv) for papers related
//! to a text snippet, parses the Atom feed, and caches results by query
//! signature to absorb rate limits. Failures degrade to an empty result
//! list with a human-readable warning, never a fault.

pub mod client;
pub mod feed;

pub use client::{RecommendClient, Recommendations};
pub use feed::{parse_feed, FeedTransport, HttpFeedTransport, Recommendation};
