//! # Domain Models
//!
//! Canonical data model for the daily scan.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated equity symbol |
//! | [`UtcDateTime`] | UTC timestamp |
//! | [`DailyBar`] / [`HistoryWindow`] | Date-ascending daily close/volume series |
//! | [`FeedItem`] / [`ReleaseEvent`] | Press-release evidence |
//! | [`TickerMetadata`] | Sector and industry classification |
//! | [`SpikeVerdict`] / [`ExclusionVerdict`] / [`Candidate`] | Pipeline outputs |
//!
//! Construction enforces invariants: tickers are normalized, timestamps are
//! UTC, and history windows are strictly date-ascending.
//!
//! ```rust,ignore
//! use spikewire_core::{DailyBar, HistoryWindow, Ticker, ValidationError};
//!
//! let ticker = Ticker::parse("xyz")?;
//! let window = HistoryWindow::new(ticker, bars)?;
//! assert!(matches!(
//!     HistoryWindow::new(Ticker::parse("XYZ")?, reversed),
//!     Err(ValidationError::UnorderedHistory { .. })
//! ));
//! ```

mod history;
mod metadata;
mod release;
mod ticker;
mod timestamp;
mod verdict;

pub use history::{DailyBar, HistoryWindow};
pub use metadata::TickerMetadata;
pub use release::{FeedItem, ReleaseEvent, ReleaseSource};
pub use ticker::Ticker;
pub use timestamp::UtcDateTime;
pub use verdict::{Candidate, ExclusionReason, ExclusionVerdict, SpikeVerdict};
