use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::adapters::rss::{parse_feed, RssEntry};
use crate::adapters::CompanyNames;
use crate::data_source::{FeedSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{FeedItem, Ticker};

/// Exchange-tagged GlobeNewswire feeds plus the PR Newswire firehose.
pub const DEFAULT_WIRE_FEEDS: [(&str, &str); 4] = [
    (
        "GlobeNewswire NASDAQ",
        "https://www.globenewswire.com/RssFeed/exchange/NASDAQ",
    ),
    (
        "GlobeNewswire NYSE",
        "https://www.globenewswire.com/RssFeed/exchange/NYSE",
    ),
    (
        "GlobeNewswire AMEX",
        "https://www.globenewswire.com/RssFeed/exchange/AMEX",
    ),
    (
        "PR Newswire",
        "https://www.prnewswire.com/rss/news-releases-list.rss",
    ),
];

type TickerIndex = HashMap<Ticker, Vec<FeedItem>>;

/// Primary press-release source: wire-service RSS feeds fetched once per run and
/// indexed by the tickers each item names.
///
/// The first lookup downloads every feed; concurrent lookups wait for that single
/// download. A feed that fails contributes nothing; if every feed fails, lookups
/// report the source as unavailable.
pub struct WireFeed {
    http: Arc<dyn HttpClient>,
    feeds: Vec<(String, String)>,
    names: CompanyNames,
    index: OnceCell<Result<TickerIndex, SourceError>>,
}

impl WireFeed {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_feeds(
            http,
            DEFAULT_WIRE_FEEDS
                .iter()
                .map(|(name, url)| ((*name).to_owned(), (*url).to_owned()))
                .collect(),
        )
    }

    /// `feeds` as `(name, url)` pairs. Item order within a ticker follows feed order.
    pub fn with_feeds(http: Arc<dyn HttpClient>, feeds: Vec<(String, String)>) -> Self {
        Self {
            http,
            feeds,
            names: CompanyNames::empty(),
            index: OnceCell::new(),
        }
    }

    /// Attributes symbol-less items by the issuer name in their title.
    pub fn with_company_names(mut self, names: CompanyNames) -> Self {
        self.names = names;
        self
    }

    async fn lookup(&self, ticker: &Ticker) -> Result<Vec<FeedItem>, SourceError> {
        let index = self.index.get_or_init(|| self.build_index()).await;
        match index {
            Ok(index) => Ok(index.get(ticker).cloned().unwrap_or_default()),
            Err(error) => Err(error.clone()),
        }
    }

    async fn build_index(&self) -> Result<TickerIndex, SourceError> {
        let mut index = TickerIndex::new();
        let mut fetched = 0usize;

        for (name, url) in &self.feeds {
            let entries = match self.fetch(url).await {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(feed = %name, error = %error, "wire feed failed");
                    continue;
                }
            };
            fetched += 1;
            info!(feed = %name, items = entries.len(), "fetched wire feed");

            for entry in entries {
                let item = entry.to_feed_item();
                for ticker in entry.tickers(&self.names) {
                    index.entry(ticker).or_default().push(item.clone());
                }
            }
        }

        if fetched == 0 && !self.feeds.is_empty() {
            return Err(SourceError::unavailable("every wire feed failed"));
        }
        info!(tickers = index.len(), "indexed wire releases");
        Ok(index)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<RssEntry>, SourceError> {
        let response = self
            .http
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| SourceError::unavailable(format!("transport error: {}", e.message())))?;
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "status {}",
                response.status
            )));
        }
        parse_feed(&response.body)
    }
}

impl FeedSource for WireFeed {
    fn name(&self) -> &str {
        "wire"
    }

    fn items<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a, Vec<FeedItem>> {
        Box::pin(self.lookup(ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::testing::ScriptedHttpClient;
    use crate::http_client::HttpResponse;

    fn rss(items: &str) -> String {
        format!(r#"<rss version="2.0"><channel><title>t</title>{items}</channel></rss>"#)
    }

    fn feeds() -> Vec<(String, String)> {
        vec![
            ("a".to_owned(), "https://wire.test/a".to_owned()),
            ("b".to_owned(), "https://wire.test/b".to_owned()),
        ]
    }

    #[tokio::test]
    async fn feeds_are_fetched_once_and_indexed_by_ticker() {
        let http = Arc::new(
            ScriptedHttpClient::new()
                .route(
                    "https://wire.test/a",
                    HttpResponse::ok(rss(
                        "<item><title>Acme wins deal</title><pubDate>Tue, 10 Mar 2026 12:00:00 GMT</pubDate><category>NASDAQ:ACME</category></item>",
                    )),
                )
                .route(
                    "https://wire.test/b",
                    HttpResponse::ok(rss(
                        "<item><title>Beta Corp (NYSE: BETA) and Acme (NASDAQ: ACME) merge</title><pubDate>Tue, 10 Mar 2026 13:00:00 GMT</pubDate></item>",
                    )),
                ),
        );
        let feed = WireFeed::with_feeds(Arc::clone(&http) as Arc<dyn HttpClient>, feeds());

        let acme = feed.items(&Ticker::parse("ACME").expect("valid")).await.expect("items");
        let beta = feed.items(&Ticker::parse("BETA").expect("valid")).await.expect("items");
        let none = feed.items(&Ticker::parse("ZZZ").expect("valid")).await.expect("items");

        assert_eq!(acme.len(), 2);
        assert_eq!(acme[0].headline, "Acme wins deal");
        assert_eq!(beta.len(), 1);
        assert!(none.is_empty());
        assert_eq!(http.requests().len(), 2);
    }

    #[tokio::test]
    async fn one_failing_feed_does_not_hide_the_others() {
        let http = Arc::new(
            ScriptedHttpClient::new()
                .fail("https://wire.test/a", "connection reset")
                .route(
                    "https://wire.test/b",
                    HttpResponse::ok(rss(
                        "<item><title>$ACME jumps</title><pubDate>Tue, 10 Mar 2026 13:00:00 GMT</pubDate></item>",
                    )),
                ),
        );
        let feed = WireFeed::with_feeds(http, feeds());

        let acme = feed.items(&Ticker::parse("ACME").expect("valid")).await.expect("items");
        assert_eq!(acme.len(), 1);
    }

    #[tokio::test]
    async fn company_names_attribute_untagged_items() {
        let http = Arc::new(
            ScriptedHttpClient::new()
                .route(
                    "https://wire.test/a",
                    HttpResponse::ok(rss(
                        "<item><title>Initech Corp. Secures Funding</title><pubDate>Tue, 10 Mar 2026 12:00:00 GMT</pubDate></item>",
                    )),
                )
                .route("https://wire.test/b", HttpResponse::ok(rss(""))),
        );
        let names: CompanyNames = [("Initech", Ticker::parse("INTC").expect("valid"))]
            .into_iter()
            .collect();
        let feed = WireFeed::with_feeds(http, feeds()).with_company_names(names);

        let items = feed.items(&Ticker::parse("INTC").expect("valid")).await.expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].headline, "Initech Corp. Secures Funding");
    }

    #[tokio::test]
    async fn all_feeds_failing_is_unavailable() {
        let http = Arc::new(
            ScriptedHttpClient::new()
                .route("https://wire.test/a", HttpResponse::new(503, ""))
                .route("https://wire.test/b", HttpResponse::ok("<html><body>blocked</body></html>")),
        );
        let feed = WireFeed::with_feeds(http, feeds());

        let error = feed
            .items(&Ticker::parse("ACME").expect("valid"))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }
}
