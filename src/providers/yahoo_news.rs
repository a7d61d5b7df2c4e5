use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use regex::Regex;
use rss::{Channel, Item};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::{NewsItem, NewsProvider};
use crate::providers::util::{http_client, with_retry};

pub const DEFAULT_BASE_URL: &str = "https://finance.yahoo.com";

const MAX_ITEMS: usize = 10;
const SUMMARY_MAX_CHARS: usize = 200;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("HTML tag pattern is valid"));

fn summarize(html: &str) -> String {
    HTML_TAG
        .replace_all(html, "")
        .trim()
        .chars()
        .take(SUMMARY_MAX_CHARS)
        .collect()
}

fn to_news_item(item: &Item) -> NewsItem {
    let summary = item
        .description()
        .or_else(|| item.content())
        .map(summarize)
        .unwrap_or_default();
    NewsItem {
        title: item.title().unwrap_or_default().to_string(),
        url: item.link().unwrap_or_default().to_string(),
        summary,
        published: item.pub_date().map(str::to_string),
    }
}

/// Headlines from the Yahoo Finance RSS feed of a ticker.
pub struct YahooNewsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooNewsProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = http_client(timeout).context("Failed to build HTTP client")?;
        Ok(YahooNewsProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl NewsProvider for YahooNewsProvider {
    #[instrument(name = "YahooNewsFetch", skip(self), fields(ticker = %ticker))]
    async fn fetch_headlines(&self, ticker: &str) -> Result<Vec<NewsItem>> {
        let url = format!("{}/rss/headline", self.base_url);
        debug!("Requesting news feed from {} for {}", url, ticker);

        let response = with_retry(
            || self.client.get(&url).query(&[("s", ticker)]).send(),
            1,
            250,
        )
        .await
        .with_context(|| format!("Request error for news feed: {ticker}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for news feed: {}",
                response.status(),
                ticker
            ));
        }

        let body = response.bytes().await?;
        let channel = Channel::read_from(&body[..])
            .with_context(|| format!("Failed to parse RSS feed for {ticker}"))?;

        let items: Vec<NewsItem> = channel
            .items()
            .iter()
            .take(MAX_ITEMS)
            .map(to_news_item)
            .collect();
        debug!("Parsed {} headlines for {}", items.len(), ticker);
        Ok(items)
    }

    fn source_name(&self) -> &str {
        "Yahoo Finance"
    }
}
