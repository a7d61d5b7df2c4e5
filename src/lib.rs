pub mod cli;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

use crate::cli::favorites::FavoritesCommand;
use crate::core::config::{API_KEY_ENV, AppConfig};
use crate::core::{MarketDataProvider, NewsService, QuoteCache, StockSearch};
use crate::providers::{FinnhubProvider, YahooNewsProvider};
use crate::server::AppState;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Search { queries: Vec<String> },
    News { ticker: String },
    Favorites(FavoritesCommand),
    Serve { bind: Option<String> },
}

/// Loads the config file (or defaults) and applies environment overrides.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    Ok(config.with_env_overrides())
}

/// Wires providers, caches and services from `config`.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let timeout = config.request_timeout();

    let finnhub = FinnhubProvider::new(
        &config.providers.finnhub.base_url,
        config.providers.finnhub.api_key.clone(),
        timeout,
    )?;
    if !finnhub.is_configured() {
        warn!(
            "No Finnhub API key configured (set {}), searches will return placeholder data",
            API_KEY_ENV
        );
    }
    let yahoo = YahooNewsProvider::new(&config.providers.yahoo_news.base_url, timeout)?;

    let search = StockSearch::new(
        Arc::new(finnhub),
        QuoteCache::new(config.cache.max_entries),
        config.search_ttl(),
    );
    let news = NewsService::new(
        Arc::new(yahoo),
        QuoteCache::new(config.cache.max_entries),
        config.news_ttl(),
    );

    Ok(AppState {
        search: Arc::new(search),
        news: Arc::new(news),
    })
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    debug!(
        "Loaded config: bind={}, search_ttl={:?}, news_ttl={:?}",
        config.server.bind,
        config.search_ttl(),
        config.news_ttl()
    );

    match command {
        AppCommand::Search { queries } => {
            let state = build_state(&config)?;
            cli::search::run(&state.search, &queries).await
        }
        AppCommand::News { ticker } => {
            let state = build_state(&config)?;
            cli::news::run(&state.news, &ticker).await
        }
        AppCommand::Favorites(action) => {
            let path = config.default_data_path()?.join("favorites");
            let favorites = store::open_favorites(&path);
            cli::favorites::run(favorites.as_ref(), action).await
        }
        AppCommand::Serve { bind } => {
            let state = build_state(&config)?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            info!("simplifiedaction {} starting", env!("CARGO_PKG_VERSION"));
            server::start_server(state, &bind).await
        }
    }
}
