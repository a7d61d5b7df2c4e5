//! Per-user favorite tickers

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub ticker: String,
    pub name: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FavoriteError {
    #[error("A ticker is required.")]
    EmptyTicker,
}

/// Normalises a ticker for storage. Blank tickers are rejected.
pub fn normalize_ticker(ticker: &str) -> Result<String, FavoriteError> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(FavoriteError::EmptyTicker);
    }
    Ok(ticker)
}

/// Builds the record stored for a new favorite. The name falls back to the
/// ticker when blank.
pub fn new_favorite(ticker: &str, name: Option<&str>) -> Result<Favorite, FavoriteError> {
    let ticker = normalize_ticker(ticker)?;
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| ticker.clone(), str::to_string);
    Ok(Favorite {
        ticker,
        name,
        added_at: Utc::now(),
    })
}

/// Storage for each user's favorites.
///
/// Adding a ticker that is already a favorite keeps its original `added_at`
/// and replaces the name. `list` returns favorites in the order they were
/// first added.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn list(&self, user: &str) -> Result<Vec<Favorite>>;

    async fn add(&self, user: &str, ticker: &str, name: Option<&str>) -> Result<Favorite>;

    /// Returns whether a favorite was removed.
    async fn remove(&self, user: &str, ticker: &str) -> Result<bool>;
}
