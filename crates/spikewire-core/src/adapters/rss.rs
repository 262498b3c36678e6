//! RSS 2.0 decoding and ticker attribution for wire-service items.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::adapters::CompanyNames;
use crate::data_source::SourceError;
use crate::{FeedItem, Ticker, UtcDateTime};

/// One decoded `<item>` with a usable title and publication time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssEntry {
    pub title: String,
    pub link: Option<String>,
    pub published_at: UtcDateTime,
    pub summary: String,
    pub categories: Vec<String>,
}

impl RssEntry {
    /// The entry as a feed item; the summary is carried over with markup removed.
    pub fn to_feed_item(&self) -> FeedItem {
        let item = FeedItem::new(self.title.clone(), self.published_at)
            .with_summary(plain_text(&self.summary));
        match &self.link {
            Some(link) => item.with_url(link.clone()),
            None => item,
        }
    }

    /// Tickers this entry is about, strongest evidence first:
    ///
    /// 1. exchange-tagged category terms (`NASDAQ:XYZ`, `NYSE-XYZ`)
    /// 2. exchange-tagged mentions in the title or summary (`(NYSE: XYZ)`)
    /// 3. `$XYZ` cashtags
    /// 4. the issuer name at the start of the title, looked up in `names`
    ///
    /// The first tier that yields anything is used on its own.
    pub fn tickers(&self, names: &CompanyNames) -> Vec<Ticker> {
        let patterns = patterns();

        let from_categories = collect(
            self.categories
                .iter()
                .filter_map(|term| patterns.category.captures(term))
                .filter_map(|captures| captures.get(1))
                .map(|symbol| symbol.as_str().to_ascii_uppercase()),
        );
        if !from_categories.is_empty() {
            return from_categories;
        }

        let text = format!("{} {}", self.title, self.summary).to_ascii_uppercase();
        let tagged = collect(
            patterns
                .exchange_mention
                .captures_iter(&text)
                .filter_map(|captures| captures.get(1))
                .map(|symbol| symbol.as_str().to_owned()),
        );
        if !tagged.is_empty() {
            return tagged;
        }

        let cashtags = collect(
            patterns
                .cashtag
                .captures_iter(&text)
                .filter_map(|captures| captures.get(1))
                .map(|symbol| symbol.as_str().to_owned()),
        );
        if !cashtags.is_empty() {
            return cashtags;
        }

        names.resolve_headline(&self.title).into_iter().collect()
    }
}

/// Decodes an RSS document. Items without a title or a parseable `pubDate` are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<RssEntry>, SourceError> {
    let document: RssDocument = quick_xml::de::from_str(xml)
        .map_err(|e| SourceError::malformed(format!("failed to parse rss: {e}")))?;

    let entries = document
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let title = item.title.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty())?;
            let published_at = UtcDateTime::parse_feed(item.pub_date.as_deref()?).ok()?;
            Some(RssEntry {
                title,
                link: item.link.map(|l| l.trim().to_owned()).filter(|l| !l.is_empty()),
                published_at,
                summary: item.description.unwrap_or_default(),
                categories: item.categories.into_iter().map(|c| c.term).collect(),
            })
        })
        .collect();

    Ok(entries)
}

struct TickerPatterns {
    category: Regex,
    exchange_mention: Regex,
    cashtag: Regex,
    markup: Regex,
}

fn patterns() -> &'static TickerPatterns {
    static PATTERNS: OnceLock<TickerPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TickerPatterns {
        category: Regex::new(r"(?i)(?:NYSE|NASDAQ|AMEX|OTC|TSX|TSX-V)[:\-]([A-Z]{1,5})")
            .expect("category pattern is valid"),
        exchange_mention: Regex::new(r"(?:NYSE|NASDAQ|AMEX|OTC)[:\s]+([A-Z]{1,5})\b")
            .expect("exchange pattern is valid"),
        cashtag: Regex::new(r"\$([A-Z]{1,5})\b").expect("cashtag pattern is valid"),
        markup: Regex::new(r"<[^>]*>").expect("markup pattern is valid"),
    })
}

/// Drops HTML tags and collapses whitespace.
fn plain_text(html: &str) -> String {
    let stripped = patterns().markup.replace_all(html, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses and de-duplicates symbols, keeping first-seen order.
fn collect(symbols: impl Iterator<Item = String>) -> Vec<Ticker> {
    let mut tickers: Vec<Ticker> = Vec::new();
    for symbol in symbols {
        if let Ok(ticker) = Ticker::parse(&symbol) {
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
    }
    tickers
}

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "category", default)]
    categories: Vec<RssCategory>,
}

#[derive(Debug, Deserialize)]
struct RssCategory {
    #[serde(rename = "$text", default)]
    term: String,
}
