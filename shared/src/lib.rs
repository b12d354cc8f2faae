pub mod cache;
pub mod config;
pub mod dates;
pub mod error;
pub mod i18n;
pub mod market_data;
pub mod templates;

pub use cache::TtlCache;
pub use config::Config;
pub use dates::{date_interval, DateWindow, Screen, View};
pub use error::MarketDataError;
pub use i18n::{get_language, selected_language, TextDict, LANGUAGES};
pub use market_data::{yahoo_ticker, Coin, HttpMarketData, MarketDataSource};
pub use templates::DashboardTemplate;
