//! Core business logic: scoring, caching, search resolution, news and favorites

pub mod cache;
pub mod config;
pub mod favorites;
pub mod log;
pub mod market;
pub mod news;
pub mod score;
pub mod search;

// Re-export main types for cleaner imports
pub use cache::QuoteCache;
pub use favorites::{Favorite, FavoritesStore};
pub use market::{CompanyProfile, MarketDataProvider, Quote, SymbolMatch};
pub use news::{NewsError, NewsFeed, NewsItem, NewsProvider, NewsService};
pub use search::{DataQuality, SearchError, SearchResult, StockSearch};
