//! Domain types: operator-selected parameters and the backend's response shapes.

pub mod account;
pub mod feeds;
pub mod levels;
pub mod market;
pub mod overlays;
pub mod params;
pub mod pips;
pub mod predictions;
pub mod trades;

pub use account::{AccountMode, AccountStatus, ConnectResponse};
pub use feeds::{MarketStatus, NewsAnalysis, NewsFeed, NewsItem};
pub use levels::{KeyLevel, KeyLevels, KeyLevelsResponse};
pub use market::{CandleSet, MarketData, ZeroLagBands};
pub use overlays::{LevelKind, OverlaySettings};
pub use params::{PolynomialParams, StrategyMode, StrategyToggles, Timeframe, TradingParams};
pub use predictions::PolynomialPredictions;
pub use trades::{
    CloseAllResponse, CloseTradeResponse, Direction, OpenTrade, TradeRequest, TradeResponse,
    TradesResponse,
};
