//! In-memory collaborators for offline runs and tests.
//!
//! Entries are keyed by the uppercased symbol. Unknown tickers answer with a
//! `NotFound` error, and each collaborator counts the calls it receives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use time::macros::date;

use crate::data_source::{FeedSource, MarketDataSource, MetadataSource, SourceError, SourceFuture};
use crate::{DailyBar, FeedItem, HistoryWindow, Ticker, TickerMetadata, ValidationError};

fn key(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

/// Scripted daily history.
#[derive(Debug, Default)]
pub struct StaticMarketData {
    bars: HashMap<String, Result<Vec<DailyBar>, SourceError>>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.bars.insert(key(symbol), Ok(bars));
        self
    }

    /// One bar per volume on consecutive calendar days from 2026-01-01, all at the
    /// same close. The last volume is the session under evaluation.
    pub fn with_volumes(self, symbol: &str, volumes: &[u64]) -> Self {
        let bars = consecutive_bars(volumes).unwrap_or_default();
        self.with_bars(symbol, bars)
    }

    pub fn with_failure(mut self, symbol: &str, error: SourceError) -> Self {
        self.bars.insert(key(symbol), Err(error));
        self
    }

    /// Delays the answer for `symbol`, to exercise out-of-order completion.
    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(key(symbol), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn lookup(&self, ticker: &Ticker) -> Result<HistoryWindow, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(ticker.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        match self.bars.get(ticker.as_str()) {
            Some(Ok(bars)) => HistoryWindow::new(ticker.clone(), bars.clone())
                .map_err(|e| SourceError::malformed(e.to_string())),
            Some(Err(error)) => Err(error.clone()),
            None => Err(SourceError::not_found(format!("no history for {ticker}"))),
        }
    }
}

fn consecutive_bars(volumes: &[u64]) -> Result<Vec<DailyBar>, ValidationError> {
    let mut date = date!(2026 - 01 - 01);
    let mut bars = Vec::with_capacity(volumes.len());
    for volume in volumes {
        bars.push(DailyBar::new(date, 10.0, *volume)?);
        date = date.next_day().unwrap_or(date);
    }
    Ok(bars)
}

impl MarketDataSource for StaticMarketData {
    fn name(&self) -> &str {
        "static"
    }

    fn history<'a>(&'a self, ticker: &'a Ticker, _sessions: usize) -> SourceFuture<'a, HistoryWindow> {
        Box::pin(self.lookup(ticker))
    }
}

/// Scripted press-release feed. Unknown tickers yield no items.
#[derive(Debug)]
pub struct StaticFeed {
    name: String,
    items: HashMap<String, Vec<FeedItem>>,
    failure: Option<SourceError>,
    calls: AtomicUsize,
}

impl StaticFeed {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: HashMap::new(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A feed whose every lookup fails with `error`.
    pub fn failing(name: impl Into<String>, error: SourceError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(name)
        }
    }

    pub fn with_items(mut self, symbol: &str, items: Vec<FeedItem>) -> Self {
        self.items.entry(key(symbol)).or_default().extend(items);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeedSource for StaticFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn items<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a, Vec<FeedItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.items.get(ticker.as_str()).cloned().unwrap_or_default()),
        };
        Box::pin(async move { result })
    }
}

/// Scripted sector/industry lookup.
#[derive(Debug, Default)]
pub struct StaticMetadata {
    entries: HashMap<String, Result<TickerMetadata, SourceError>>,
    calls: AtomicUsize,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, symbol: &str, metadata: TickerMetadata) -> Self {
        self.entries.insert(key(symbol), Ok(metadata));
        self
    }

    pub fn with_failure(mut self, symbol: &str, error: SourceError) -> Self {
        self.entries.insert(key(symbol), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataSource for StaticMetadata {
    fn name(&self) -> &str {
        "static"
    }

    fn metadata<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a, TickerMetadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.entries.get(ticker.as_str()) {
            Some(entry) => entry.clone(),
            None => Err(SourceError::not_found(format!("no metadata for {ticker}"))),
        };
        Box::pin(async move { result })
    }
}
