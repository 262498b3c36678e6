//! Time-windowed press-release matching over prioritized feeds.
//!
//! Feeds are polled in the order they were registered. The first feed that yields
//! at least one qualifying item wins; later feeds are never consulted for that
//! ticker, even when they hold a closer item. A feed that errors counts as empty.
//!
//! With an Eastern exclusion range configured, weekday items published inside it
//! never qualify.

use std::sync::Arc;

use time::Duration;
use tracing::{debug, warn};

use crate::config::CorrelationConfig;
use crate::data_source::FeedSource;
use crate::market_hours::EasternSession;
use crate::{FeedItem, ReleaseEvent, ReleaseSource, Ticker, UtcDateTime};

#[derive(Clone)]
pub struct FeedMatcher {
    feeds: Vec<Arc<dyn FeedSource>>,
    window: Duration,
    required_keywords: Vec<String>,
    excluded_session: Option<EasternSession>,
}

impl std::fmt::Debug for FeedMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedMatcher")
            .field(
                "feeds",
                &self.feeds.iter().map(|feed| feed.name()).collect::<Vec<_>>(),
            )
            .field("window", &self.window)
            .field("required_keywords", &self.required_keywords)
            .field("excluded_session", &self.excluded_session)
            .finish()
    }
}

impl FeedMatcher {
    /// `feeds` in priority order: index 0 is primary, the rest are fallbacks.
    /// An invalid exclusion range is rejected by config validation and ignored here.
    pub fn new(feeds: Vec<Arc<dyn FeedSource>>, config: &CorrelationConfig) -> Self {
        Self {
            feeds,
            window: Duration::hours(i64::from(config.window_hours)),
            required_keywords: config
                .required_keywords
                .iter()
                .map(|keyword| keyword.to_lowercase())
                .collect(),
            excluded_session: config.excluded_session().ok().flatten(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn feed_names(&self) -> Vec<&str> {
        self.feeds.iter().map(|feed| feed.name()).collect()
    }

    /// The release closest to `reference_time` inside `(reference_time - window, reference_time]`
    /// from the highest-priority feed that has one.
    pub async fn find_release(
        &self,
        ticker: &Ticker,
        reference_time: UtcDateTime,
    ) -> Option<ReleaseEvent> {
        for (priority, feed) in self.feeds.iter().enumerate() {
            let items = match feed.items(ticker).await {
                Ok(items) => items,
                Err(error) => {
                    warn!(
                        ticker = %ticker,
                        feed = feed.name(),
                        code = error.code(),
                        error = %error,
                        "feed unavailable, treating as empty"
                    );
                    continue;
                }
            };

            if let Some(item) = self.closest(items, reference_time) {
                debug!(
                    ticker = %ticker,
                    feed = feed.name(),
                    published_at = %item.published_at,
                    "matched release"
                );
                return Some(ReleaseEvent::from_item(
                    ticker.clone(),
                    item,
                    ReleaseSource::for_priority(priority),
                    feed.name(),
                ));
            }
        }

        None
    }

    /// Items are all at or before the reference time, so the closest one is the latest.
    /// Equal timestamps keep the first item seen.
    fn closest(&self, items: Vec<FeedItem>, reference_time: UtcDateTime) -> Option<FeedItem> {
        let mut best: Option<FeedItem> = None;
        for item in items {
            if !self.qualifies(&item, reference_time) {
                continue;
            }
            let closer = best
                .as_ref()
                .map_or(true, |current| item.published_at > current.published_at);
            if closer {
                best = Some(item);
            }
        }
        best
    }

    fn qualifies(&self, item: &FeedItem, reference_time: UtcDateTime) -> bool {
        let window_start = reference_time.saturating_sub(self.window);
        if item.published_at <= window_start || item.published_at > reference_time {
            return false;
        }
        if self
            .excluded_session
            .is_some_and(|session| session.contains(item.published_at))
        {
            return false;
        }
        if self.required_keywords.is_empty() {
            return true;
        }
        let text = match &item.summary {
            Some(summary) => format!("{} {}", item.headline, summary).to_lowercase(),
            None => item.headline.to_lowercase(),
        };
        self.required_keywords
            .iter()
            .any(|keyword| text.contains(keyword.as_str()))
    }
}
