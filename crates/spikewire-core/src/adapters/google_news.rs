use std::sync::Arc;

use crate::adapters::rss::parse_feed;
use crate::data_source::{FeedSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{FeedItem, Ticker};

const SEARCH_URL: &str = "https://news.google.com/rss/search";

/// General-news fallback: a per-ticker Google News RSS search. Every returned item
/// is attributed to the queried ticker.
pub struct GoogleNewsFeed {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl GoogleNewsFeed {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(http, SEARCH_URL)
    }

    pub fn with_base_url(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn search_url(&self, ticker: &Ticker) -> String {
        format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            self.base_url,
            urlencoding::encode(&format!("{} stock", ticker.as_str())),
        )
    }

    async fn search(&self, ticker: &Ticker) -> Result<Vec<FeedItem>, SourceError> {
        let response = self
            .http
            .execute(HttpRequest::get(self.search_url(ticker)))
            .await
            .map_err(|e| {
                SourceError::unavailable(format!("google news transport error: {}", e.message()))
            })?;
        if response.status == 429 {
            return Err(SourceError::rate_limited("google news returned status 429"));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "google news returned status {}",
                response.status
            )));
        }

        let entries = parse_feed(&response.body)?;
        Ok(entries.iter().map(|entry| entry.to_feed_item()).collect())
    }
}

impl FeedSource for GoogleNewsFeed {
    fn name(&self) -> &str {
        "google-news"
    }

    fn items<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a, Vec<FeedItem>> {
        Box::pin(self.search(ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::testing::ScriptedHttpClient;
    use crate::http_client::HttpResponse;

    #[tokio::test]
    async fn every_item_belongs_to_the_queried_ticker() {
        let http = Arc::new(ScriptedHttpClient::new().route(
            SEARCH_URL,
            HttpResponse::ok(
                r#"<rss version="2.0"><channel>
                    <item><title>XYZ shares surge after contract win - Reuters</title>
                      <link>https://news.google.com/articles/1</link>
                      <pubDate>Tue, 10 Mar 2026 15:04:00 GMT</pubDate></item>
                    <item><title>Sector roundup</title>
                      <pubDate>Tue, 10 Mar 2026 09:00:00 GMT</pubDate></item>
                  </channel></rss>"#,
            ),
        ));
        let feed = GoogleNewsFeed::new(Arc::clone(&http) as Arc<dyn HttpClient>);

        let items = feed
            .items(&Ticker::parse("XYZ").expect("valid"))
            .await
            .expect("items");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url.as_deref(), Some("https://news.google.com/articles/1"));

        let requested = &http.requests()[0].url;
        assert!(requested.contains("q=XYZ%20stock"));
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let http = Arc::new(ScriptedHttpClient::new().route(SEARCH_URL, HttpResponse::new(500, "")));
        let feed = GoogleNewsFeed::new(http);

        let error = feed
            .items(&Ticker::parse("XYZ").expect("valid"))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }
}
