use crate::core::favorites::{Favorite, FavoritesStore, new_favorite, normalize_ticker};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const PARTITION: &str = "favorites";

/// Favorites persisted in a fjall keyspace, one key per `(user, ticker)`.
pub struct DiskFavorites {
    keyspace: Keyspace,
    partition: PartitionHandle,
    // Serialises read-then-write in `add` and `remove`.
    writes: Mutex<()>,
}

fn user_prefix(user: &str) -> String {
    format!("{user}\0")
}

fn entry_key(user: &str, ticker: &str) -> String {
    format!("{user}\0{ticker}")
}

impl DiskFavorites {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open favorites store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open favorites partition")?;
        Ok(Self {
            keyspace,
            partition,
            writes: Mutex::new(()),
        })
    }

    fn read(&self, key: &str) -> Result<Option<Favorite>> {
        match self.partition.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl FavoritesStore for DiskFavorites {
    async fn list(&self, user: &str) -> Result<Vec<Favorite>> {
        let mut favorites = Vec::new();
        for pair in self.partition.prefix(user_prefix(user)) {
            let (_, value) = pair?;
            let favorite: Favorite = serde_json::from_slice(&value)
                .with_context(|| format!("Corrupt favorite entry for user {user}"))?;
            favorites.push(favorite);
        }
        favorites.sort_by(|a, b| a.added_at.cmp(&b.added_at));
        Ok(favorites)
    }

    async fn add(&self, user: &str, ticker: &str, name: Option<&str>) -> Result<Favorite> {
        let mut favorite = new_favorite(ticker, name)?;
        let key = entry_key(user, &favorite.ticker);
        let _guard = self.writes.lock().await;
        if let Some(existing) = self.read(&key)? {
            favorite.added_at = existing.added_at;
        }

        self.partition
            .insert(key.as_str(), serde_json::to_vec(&favorite)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Favorite PUT for {}: {}", user, favorite.ticker);
        Ok(favorite)
    }

    async fn remove(&self, user: &str, ticker: &str) -> Result<bool> {
        let key = entry_key(user, &normalize_ticker(ticker)?);
        let _guard = self.writes.lock().await;
        if self.read(&key)?.is_none() {
            return Ok(false);
        }
        self.partition.remove(key.as_str())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Favorite REMOVE for {}: {}", user, key);
        Ok(true)
    }
}
