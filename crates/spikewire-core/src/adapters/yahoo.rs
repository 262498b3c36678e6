use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::data_source::{MarketDataSource, MetadataSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::throttling::RequestThrottle;
use crate::{DailyBar, HistoryWindow, Ticker, TickerMetadata, UtcDateTime};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_TTL: Duration = Duration::from_secs(3600);

/// Cookie/crumb session for Yahoo's unofficial API.
///
/// Yahoo requires:
/// 1. A session cookie from fc.yahoo.com (kept by the client's cookie jar)
/// 2. A crumb token from `/v1/test/getcrumb`, passed as a query parameter
///
/// The crumb is cached for an hour and shared by every clone. One session backs
/// both [`YahooMarketData`] and [`YahooMetadata`], so they also share a throttle.
#[derive(Clone)]
pub struct YahooSession {
    http: Arc<dyn HttpClient>,
    throttle: RequestThrottle,
    crumb: Arc<Mutex<Option<CachedCrumb>>>,
}

#[derive(Debug, Clone)]
struct CachedCrumb {
    value: String,
    fetched_at: Instant,
}

impl YahooSession {
    pub fn new(http: Arc<dyn HttpClient>, throttle: RequestThrottle) -> Self {
        Self {
            http,
            throttle,
            crumb: Arc::new(Mutex::new(None)),
        }
    }

    async fn crumb(&self) -> Result<String, SourceError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached
            .as_ref()
            .filter(|crumb| crumb.fetched_at.elapsed() < CRUMB_TTL)
        {
            return Ok(crumb.value.clone());
        }

        let value = self.fetch_crumb().await?;
        *cached = Some(CachedCrumb {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }

    async fn fetch_crumb(&self) -> Result<String, SourceError> {
        let cookie_request = HttpRequest::get(COOKIE_URL).with_header("referer", REFERER);
        // fc.yahoo.com answers 404 while still setting the session cookie.
        self.http.execute(cookie_request).await.map_err(|e| {
            SourceError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
        })?;

        for endpoint in CRUMB_URLS {
            let request = HttpRequest::get(endpoint).with_header("referer", REFERER);
            let Ok(response) = self.http.execute(request).await else {
                continue;
            };
            if response.status == 429 {
                return Err(SourceError::rate_limited(
                    "Yahoo rate limited while fetching crumb",
                ));
            }
            let body = response.body.trim();
            if !response.is_success() || body.is_empty() || body.contains('<') {
                continue;
            }
            if body.len() < 100 && !body.contains(char::is_whitespace) {
                return Ok(body.to_owned());
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch Yahoo crumb from all endpoints",
        ))
    }

    /// Throttled, crumb-authenticated GET decoded as JSON. `url` must already carry
    /// a query string.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let crumb = self.crumb().await?;
        self.throttle.acquire().await;

        let request = HttpRequest::get(format!("{url}&crumb={}", urlencoding::encode(&crumb)))
            .with_header("referer", REFERER);
        let response = self.http.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        match response.status {
            status if (200..300).contains(&status) => {}
            401 => {
                self.invalidate().await;
                return Err(SourceError::unavailable("yahoo rejected the session crumb"));
            }
            404 => return Err(SourceError::not_found("yahoo has no data for this symbol")),
            429 => return Err(SourceError::rate_limited("yahoo returned status 429")),
            status => {
                return Err(SourceError::unavailable(format!(
                    "yahoo returned status {status}"
                )))
            }
        }

        serde_json::from_str(&response.body)
            .map_err(|e| SourceError::malformed(format!("failed to parse yahoo response: {e}")))
    }
}

/// Daily history from the v8 chart endpoint.
#[derive(Clone)]
pub struct YahooMarketData {
    session: YahooSession,
}

impl YahooMarketData {
    pub fn new(session: YahooSession) -> Self {
        Self { session }
    }

    async fn fetch_history(
        &self,
        ticker: &Ticker,
        sessions: usize,
    ) -> Result<HistoryWindow, SourceError> {
        let url = format!(
            "{CHART_URL}/{}?range={}&interval=1d&includePrePost=false",
            urlencoding::encode(&ticker.provider_symbol()),
            chart_range(sessions),
        );
        let response: ChartResponse = self.session.get_json(&url).await?;
        let window = parse_chart(ticker, response)?;
        debug!(ticker = %ticker, bars = window.len(), "fetched daily history");
        Ok(window)
    }
}

impl MarketDataSource for YahooMarketData {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn history<'a>(&'a self, ticker: &'a Ticker, sessions: usize) -> SourceFuture<'a, HistoryWindow> {
        Box::pin(self.fetch_history(ticker, sessions))
    }
}

/// Sector, industry and display name from the quoteSummary endpoint.
#[derive(Clone)]
pub struct YahooMetadata {
    session: YahooSession,
}

impl YahooMetadata {
    pub fn new(session: YahooSession) -> Self {
        Self { session }
    }

    async fn fetch_metadata(&self, ticker: &Ticker) -> Result<TickerMetadata, SourceError> {
        let url = format!(
            "{SUMMARY_URL}/{}?modules=assetProfile%2Cprice",
            urlencoding::encode(&ticker.provider_symbol()),
        );
        let response: QuoteSummaryResponse = self.session.get_json(&url).await?;
        parse_summary(response)
    }
}

impl MetadataSource for YahooMetadata {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn metadata<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a, TickerMetadata> {
        Box::pin(self.fetch_metadata(ticker))
    }
}

/// Smallest chart range that holds `sessions` trading days.
fn chart_range(sessions: usize) -> &'static str {
    match sessions {
        0..=55 => "3mo",
        56..=115 => "6mo",
        116..=240 => "1y",
        _ => "2y",
    }
}

fn parse_chart(ticker: &Ticker, response: ChartResponse) -> Result<HistoryWindow, SourceError> {
    if let Some(error) = response.chart.error {
        return Err(SourceError::not_found(format!(
            "yahoo chart error {}: {}",
            error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::malformed("no chart data in response"))?;
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::malformed("no quote data in chart response"))?;

    let mut bars: Vec<DailyBar> = Vec::with_capacity(timestamps.len());
    for (index, seconds) in timestamps.into_iter().enumerate() {
        let close = quote.close.get(index).copied().flatten();
        let volume = quote.volume.get(index).copied().flatten();
        let (Some(close), Some(volume)) = (close, volume) else {
            continue;
        };
        let Some(at) = UtcDateTime::from_unix_timestamp(seconds) else {
            continue;
        };
        let Ok(bar) = DailyBar::new(at.date(), close, volume) else {
            continue;
        };

        // Yahoo repeats the live session as a trailing row; keep the latest print.
        match bars.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            Some(last) if last.date > bar.date => continue,
            _ => bars.push(bar),
        }
    }

    HistoryWindow::new(ticker.clone(), bars)
        .map_err(|e| SourceError::malformed(e.to_string()))
}

fn parse_summary(response: QuoteSummaryResponse) -> Result<TickerMetadata, SourceError> {
    if let Some(error) = response.quote_summary.error {
        return Err(SourceError::not_found(format!(
            "yahoo quoteSummary error {}: {}",
            error.code, error.description
        )));
    }

    let result = response
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::not_found("no quoteSummary result"))?;

    let profile = result.asset_profile.unwrap_or_default();
    let metadata = TickerMetadata::new(
        profile.sector.unwrap_or_default(),
        profile.industry.unwrap_or_default(),
    );
    let name = result
        .price
        .and_then(|price| price.short_name.or(price.long_name))
        .unwrap_or_default();
    Ok(metadata.with_name(name))
}

#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfile>,
    #[serde(default)]
    price: Option<PriceModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AssetProfile {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PriceModule {
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
}
