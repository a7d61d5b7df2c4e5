use crate::core::favorites::{Favorite, FavoritesStore, new_favorite, normalize_ticker};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory favorites, lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryFavorites {
    inner: Arc<Mutex<HashMap<String, Vec<Favorite>>>>,
}

impl MemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesStore for MemoryFavorites {
    async fn list(&self, user: &str) -> Result<Vec<Favorite>> {
        let favorites = self.inner.lock().await;
        Ok(favorites.get(user).cloned().unwrap_or_default())
    }

    async fn add(&self, user: &str, ticker: &str, name: Option<&str>) -> Result<Favorite> {
        let favorite = new_favorite(ticker, name)?;
        let mut favorites = self.inner.lock().await;
        let entries = favorites.entry(user.to_string()).or_default();

        let stored = match entries.iter().position(|f| f.ticker == favorite.ticker) {
            Some(index) => {
                entries[index].name = favorite.name;
                entries[index].clone()
            }
            None => {
                entries.push(favorite.clone());
                favorite
            }
        };
        debug!("Favorite PUT for {}: {}", user, stored.ticker);
        Ok(stored)
    }

    async fn remove(&self, user: &str, ticker: &str) -> Result<bool> {
        let ticker = normalize_ticker(ticker)?;
        let mut favorites = self.inner.lock().await;
        let Some(entries) = favorites.get_mut(user) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|f| f.ticker != ticker);
        debug!("Favorite REMOVE for {}: {}", user, ticker);
        Ok(entries.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::favorites::FavoriteError;

    #[tokio::test]
    async fn test_add_list_remove() {
        let store = MemoryFavorites::new();

        assert!(store.list("alice").await.unwrap().is_empty());

        store.add("alice", "aapl", Some("Apple")).await.unwrap();
        store.add("alice", "MSFT", None).await.unwrap();
        store.add("bob", "TSLA", None).await.unwrap();

        let tickers: Vec<_> = store
            .list("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.ticker)
            .collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);

        assert!(store.remove("alice", " aapl").await.unwrap());
        assert!(!store.remove("alice", "AAPL").await.unwrap());
        assert!(!store.remove("carol", "AAPL").await.unwrap());
        assert_eq!(store.list("alice").await.unwrap().len(), 1);
        assert_eq!(store.list("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_re_adding_keeps_position_and_updates_name() {
        let store = MemoryFavorites::new();
        let first = store.add("alice", "AAPL", None).await.unwrap();
        store.add("alice", "NVDA", None).await.unwrap();
        let again = store.add("alice", "aapl", Some("Apple Inc")).await.unwrap();

        assert_eq!(again.added_at, first.added_at);
        assert_eq!(again.name, "Apple Inc");
        let list = store.list("alice").await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].ticker, "AAPL");
    }

    #[tokio::test]
    async fn test_blank_ticker_is_rejected() {
        let store = MemoryFavorites::new();
        let err = store.add("alice", " ", None).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<FavoriteError>(),
            Some(&FavoriteError::EmptyTicker)
        );
    }
}
