//! Market data abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Real-time quote snapshot. Any field may be missing when the provider has
/// no data for the symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "c", default)]
    pub current: Option<f64>,
    #[serde(rename = "d", default)]
    pub change: Option<f64>,
    #[serde(rename = "dp", default)]
    pub percent_change: Option<f64>,
    #[serde(rename = "h", default)]
    pub high: Option<f64>,
    #[serde(rename = "l", default)]
    pub low: Option<f64>,
    #[serde(rename = "o", default)]
    pub open: Option<f64>,
    #[serde(rename = "pc", default)]
    pub previous_close: Option<f64>,
}

impl Quote {
    /// True when the current price is a usable number.
    pub fn has_price(&self) -> bool {
        self.current.is_some_and(f64::is_finite)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "finnhubIndustry", default)]
    pub finnhub_industry: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl CompanyProfile {
    pub fn display_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn sector(&self) -> Option<&str> {
        non_empty(&self.finnhub_industry).or_else(|| non_empty(&self.industry))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "displaySymbol", default)]
    pub display_symbol: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl SymbolMatch {
    /// Common stock, or a match the provider left untyped.
    pub fn is_common_stock(&self) -> bool {
        match self.kind.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(kind) => kind == "Common Stock",
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        non_empty(&self.symbol).or_else(|| non_empty(&self.display_symbol))
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>>;

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>>;

    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>>;

    /// Whether the provider has the credentials it needs to answer at all.
    fn is_configured(&self) -> bool {
        true
    }
}
