pub mod finnhub;
pub mod util;
pub mod yahoo_news;

pub use finnhub::FinnhubProvider;
pub use yahoo_news::YahooNewsProvider;
