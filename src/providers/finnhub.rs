use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::{CompanyProfile, MarketDataProvider, Quote, SymbolMatch};
use crate::providers::util::{http_client, with_retry};

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub REST client for symbol search, quotes and company profiles.
pub struct FinnhubProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize, Debug)]
struct SymbolSearchResponse {
    #[serde(default)]
    result: Vec<SymbolMatch>,
}

fn normalize_symbol(symbol: &str) -> Option<String> {
    let symbol = symbol.trim().to_uppercase();
    (!symbol.is_empty()).then_some(symbol)
}

impl FinnhubProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = http_client(timeout).context("Failed to build HTTP client")?;
        Ok(FinnhubProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
        })
    }

    /// GETs `path` and decodes the body. A JSON `null` body decodes to `None`.
    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let token = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Finnhub API key is not configured"))?;

        let url = format!("{}{}", self.base_url, path);
        debug!("Requesting {} with {:?}", url, params);

        let response = with_retry(
            || {
                self.client
                    .get(&url)
                    .query(params)
                    .query(&[("token", token)])
                    .send()
            },
            1,
            250,
        )
        .await
        .with_context(|| format!("Request error for {path}"))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for {}", response.status(), path));
        }

        let text = response.text().await?;
        let body: Option<T> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON response for {path}"))?;
        Ok(body)
    }
}

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    #[instrument(name = "FinnhubSearch", skip(self), fields(query = %query))]
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let response: Option<SymbolSearchResponse> =
            self.request("/search", &[("q", query)]).await?;
        Ok(response.map(|r| r.result).unwrap_or_default())
    }

    #[instrument(name = "FinnhubQuote", skip(self), fields(symbol = %symbol))]
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let Some(symbol) = normalize_symbol(symbol) else {
            return Ok(None);
        };
        self.request("/quote", &[("symbol", symbol.as_str())]).await
    }

    #[instrument(name = "FinnhubProfile", skip(self), fields(symbol = %symbol))]
    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>> {
        let Some(symbol) = normalize_symbol(symbol) else {
            return Ok(None);
        };
        self.request("/stock/profile2", &[("symbol", symbol.as_str())])
            .await
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
