//! Collaborator contracts and the shared source error type.
//!
//! The pipeline never talks to the network itself. Everything it reads comes
//! through one of these traits, so each collaborator can be swapped for an
//! in-memory implementation in tests.
//!
//! | Trait | Supplies | Production adapter |
//! |-------|----------|--------------------|
//! | [`MarketDataSource`] | [`HistoryWindow`] | [`YahooMarketData`](crate::adapters::YahooMarketData) |
//! | [`FeedSource`] | [`FeedItem`]s for a ticker | [`WireFeed`](crate::adapters::WireFeed), [`GoogleNewsFeed`](crate::adapters::GoogleNewsFeed) |
//! | [`MetadataSource`] | [`TickerMetadata`] | [`YahooMetadata`](crate::adapters::YahooMetadata) |
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`; tickers are evaluated on concurrent tasks
//! that share one instance of each collaborator.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{FeedItem, HistoryWindow, Ticker, TickerMetadata};

/// Boxed future returned by every collaborator call.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Collaborator-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Malformed,
    NotFound,
    Internal,
}

/// Structured error returned by collaborators. The pipeline degrades every one of
/// these to "no data" for the affected ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Daily history provider.
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches date-ascending daily bars ending with the most recent session.
    ///
    /// `sessions` is the minimum number of bars the caller needs; providers may
    /// return more. Returning fewer is not an error here, the detector decides.
    fn history<'a>(&'a self, ticker: &'a Ticker, sessions: usize) -> SourceFuture<'a, HistoryWindow>;
}

/// A press-release feed queried per ticker.
pub trait FeedSource: Send + Sync {
    fn name(&self) -> &str;

    /// All items the feed attributes to `ticker`, in feed order. Window filtering
    /// is the matcher's job.
    fn items<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a, Vec<FeedItem>>;
}

/// Sector/industry lookup.
pub trait MetadataSource: Send + Sync {
    fn name(&self) -> &str;

    fn metadata<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a, TickerMetadata>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code() {
        let error = SourceError::malformed("bad xml");
        assert_eq!(error.to_string(), "bad xml (source.malformed)");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }
}
