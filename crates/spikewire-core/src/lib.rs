//! # Spikewire Core
//!
//! Detection, correlation and filtering for the daily PR volume-spike scan.
//!
//! ## Overview
//!
//! For every ticker in the universe the pipeline:
//!
//! 1. loads daily history and runs the dual-ratio **volume spike test**
//! 2. for spikes only, looks for a **press release** in a trailing window, polling
//!    feeds in priority order
//! 3. applies the **exclusion filter** (denylist, sector, keywords)
//!
//! Spikes that survive become [`Candidate`]s for alerting and reporting.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo, wire-service RSS, Google News and in-memory collaborators |
//! | [`config`] | YAML run configuration |
//! | [`data_source`] | Collaborator traits and [`SourceError`] |
//! | [`detector`] | [`SpikeDetector`] |
//! | [`domain`] | Tickers, history, releases, verdicts |
//! | [`error`] | Error types |
//! | [`exclusion`] | [`ExclusionFilter`] and [`Denylist`] |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`market_hours`] | US Eastern session clock |
//! | [`matcher`] | [`FeedMatcher`] |
//! | [`notify`] | Slack and log alert dispatch |
//! | [`pipeline`] | Per-ticker orchestration |
//! | [`report`] | JSON and Markdown report artifacts |
//! | [`throttling`] | Provider request throttle |
//! | [`universe`] | Universe loading |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use spikewire_core::adapters::{StaticFeed, StaticMarketData, StaticMetadata};
//! use spikewire_core::{Collaborators, Denylist, Pipeline, ScanConfig, Ticker, UtcDateTime};
//!
//! let collaborators = Collaborators {
//!     market_data: Arc::new(StaticMarketData::new().with_volumes("XYZ", &volumes)),
//!     feeds: vec![Arc::new(StaticFeed::new("wire"))],
//!     metadata: Arc::new(StaticMetadata::new()),
//! };
//! let pipeline = Pipeline::new(&ScanConfig::default(), collaborators, Denylist::empty());
//! let report = pipeline.run(&[Ticker::parse("XYZ")?], UtcDateTime::now()).await;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌─────────────┐   ┌─────────────────┐
//! │ MarketData   │──▶│ SpikeDetector │──▶│ FeedMatcher │──▶│ ExclusionFilter │
//! └──────────────┘   └───────────────┘   └──────┬──────┘   └────────┬────────┘
//!                                               │                   │
//!                                    primary ▶ fallback        Metadata + Denylist
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod detector;
pub mod domain;
pub mod error;
pub mod exclusion;
pub mod http_client;
pub mod market_hours;
pub mod matcher;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod throttling;
pub mod universe;

pub use config::ScanConfig;

pub use data_source::{
    FeedSource, MarketDataSource, MetadataSource, SourceError, SourceErrorKind, SourceFuture,
};

pub use detector::SpikeDetector;

pub use domain::{
    Candidate, DailyBar, ExclusionReason, ExclusionVerdict, FeedItem, HistoryWindow,
    ReleaseEvent, ReleaseSource, SpikeVerdict, Ticker, TickerMetadata, UtcDateTime,
};

pub use error::{
    ConfigError, EvaluationError, NotifyError, ReportError, SpikeError, ValidationError,
};

pub use exclusion::{Denylist, ExclusionFilter};

pub use http_client::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use market_hours::EasternSession;

pub use matcher::FeedMatcher;

pub use notify::{AlertDispatcher, LogDispatcher, SlackNotifier};

pub use pipeline::{Collaborators, Evaluation, Outcome, Pipeline, RunReport, RunStats};

pub use report::{write_reports, ReportPaths};

pub use throttling::RequestThrottle;

pub use universe::load_universe;
