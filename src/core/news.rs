//! Headline feeds per ticker

use crate::core::cache::QuoteCache;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{instrument, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(rename = "titre")]
    pub title: String,
    pub url: String,
    #[serde(rename = "resume")]
    pub summary: String,
    #[serde(rename = "date_publi")]
    pub published: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsFeed {
    pub ticker: String,
    pub source: String,
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NewsError {
    #[error("A ticker is required (e.g. AAPL).")]
    EmptyTicker,
    #[error("Unable to fetch news for {ticker}: {reason}")]
    Unavailable { ticker: String, reason: String },
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_headlines(&self, ticker: &str) -> Result<Vec<NewsItem>>;

    fn source_name(&self) -> &str;
}

/// Serves headlines through a short-lived cache. Failed fetches are reported
/// to the caller and retried on the next request.
pub struct NewsService {
    provider: Arc<dyn NewsProvider>,
    cache: QuoteCache<Vec<NewsItem>>,
    ttl: Duration,
}

impl NewsService {
    pub fn new(
        provider: Arc<dyn NewsProvider>,
        cache: QuoteCache<Vec<NewsItem>>,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            ttl,
        }
    }

    #[instrument(name = "NewsHeadlines", skip(self))]
    pub async fn headlines(&self, ticker: &str) -> Result<NewsFeed, NewsError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(NewsError::EmptyTicker);
        }

        let items = self
            .cache
            .try_get_or_compute(&ticker, self.ttl, || {
                self.provider.fetch_headlines(&ticker)
            })
            .await
            .map_err(|e| {
                warn!("News feed failed for {}: {:#}", ticker, e);
                NewsError::Unavailable {
                    ticker: ticker.clone(),
                    reason: format!("{e:#}"),
                }
            })?;

        Ok(NewsFeed {
            source: self.provider.source_name().to_string(),
            ticker,
            items,
        })
    }
}
