use serde::{Deserialize, Serialize};

use crate::{Ticker, UtcDateTime};

/// A press-release-like item as returned by a feed collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub headline: String,
    pub published_at: UtcDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Body text or description, when the feed carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl FeedItem {
    pub fn new(headline: impl Into<String>, published_at: UtcDateTime) -> Self {
        Self {
            headline: headline.into(),
            published_at,
            url: None,
            summary: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        let summary = summary.into();
        self.summary = (!summary.trim().is_empty()).then_some(summary);
        self
    }
}

/// Priority tier of the feed a release was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseSource {
    Primary,
    Fallback,
}

impl ReleaseSource {
    /// The first feed in priority order is primary; every later one is a fallback.
    pub const fn for_priority(index: usize) -> Self {
        if index == 0 {
            Self::Primary
        } else {
            Self::Fallback
        }
    }
}

/// The press release retained for a ticker on the evaluation day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub ticker: Ticker,
    pub headline: String,
    pub published_at: UtcDateTime,
    pub source: ReleaseSource,
    pub feed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ReleaseEvent {
    pub fn from_item(
        ticker: Ticker,
        item: FeedItem,
        source: ReleaseSource,
        feed: impl Into<String>,
    ) -> Self {
        Self {
            ticker,
            headline: item.headline,
            published_at: item.published_at,
            source,
            feed: feed.into(),
            url: item.url,
        }
    }
}
