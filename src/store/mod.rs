pub mod disk;
pub mod memory;

use crate::core::FavoritesStore;
use disk::DiskFavorites;
use memory::MemoryFavorites;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens the on-disk favorites under `path`, falling back to an in-memory
/// store when the keyspace cannot be opened.
pub fn open_favorites(path: &Path) -> Arc<dyn FavoritesStore> {
    match DiskFavorites::open(path) {
        Ok(store) => {
            debug!("Opened favorites store at {}", path.display());
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                "Favorites will not persist, failed to open {}: {:#}",
                path.display(),
                e
            );
            Arc::new(MemoryFavorites::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_favorites_on_disk() {
        let dir = tempdir().unwrap();
        let store = open_favorites(&dir.path().join("favorites"));
        store.add("local", "AAPL", None).await.unwrap();

        let list = store.list("local").await.unwrap();
        assert_eq!(list.len(), 1);
        assert!(dir.path().join("favorites").is_dir());
    }

    #[tokio::test]
    async fn test_open_favorites_falls_back_to_memory() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let store = open_favorites(&blocker);
        store.add("local", "MSFT", None).await.unwrap();
        assert_eq!(store.list("local").await.unwrap().len(), 1);
    }
}
