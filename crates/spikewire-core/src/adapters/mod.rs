//! # Collaborator Adapters
//!
//! | Adapter | Trait | Backend |
//! |---------|-------|---------|
//! | [`YahooMarketData`] | `MarketDataSource` | Yahoo v8 chart API |
//! | [`YahooMetadata`] | `MetadataSource` | Yahoo quoteSummary API |
//! | [`WireFeed`] | `FeedSource` (primary) | GlobeNewswire and PR Newswire RSS |
//! | [`GoogleNewsFeed`] | `FeedSource` (fallback) | Google News RSS search |
//! | [`StaticMarketData`], [`StaticFeed`], [`StaticMetadata`] | all three | in-memory |
//!
//! [`CompanyNames`] maps issuer names to tickers for wire items without a symbol.
//!
//! Network adapters never retry. A failed call surfaces as a [`SourceError`](crate::SourceError)
//! and the pipeline degrades it to "no data" for that ticker.

mod company_names;
mod google_news;
mod memory;
pub mod rss;
mod wire;
mod yahoo;

pub use company_names::CompanyNames;
pub use google_news::GoogleNewsFeed;
pub use memory::{StaticFeed, StaticMarketData, StaticMetadata};
pub use wire::{WireFeed, DEFAULT_WIRE_FEEDS};
pub use yahoo::{YahooMarketData, YahooMetadata, YahooSession};
