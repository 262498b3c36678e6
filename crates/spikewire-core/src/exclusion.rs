//! Sector, keyword and denylist noise filter.
//!
//! Checks run in precedence order and the first hit wins:
//!
//! 1. `DENYLIST`: the ticker is in the run's denylist.
//! 2. `SECTOR`: the provider sector equals an excluded sector (case-insensitive).
//! 3. `KEYWORD`: the industry or the release headline contains an excluded keyword
//!    (case-insensitive substring).
//!
//! Missing metadata never excludes on its own; the denylist and headline checks
//! still apply.

use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use crate::config::ExclusionConfig;
use crate::universe::parse_ticker_lines;
use crate::{
    ConfigError, ExclusionReason, ExclusionVerdict, ReleaseEvent, Ticker, TickerMetadata,
};

/// Tickers always excluded. Loaded once per run and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Denylist(HashSet<Ticker>);

impl Denylist {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads a one-ticker-per-line file. A missing file yields an empty denylist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "denylist file not found, continuing with an empty denylist");
                return Ok(Self::empty());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let tickers = parse_ticker_lines(&content, &path.display().to_string())?;
        Ok(tickers.into_iter().collect())
    }

    pub fn from_config(config: &ExclusionConfig) -> Result<Self, ConfigError> {
        match &config.tickers_denylist_path {
            Some(path) => Self::load(path),
            None => Ok(Self::empty()),
        }
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.0.contains(ticker)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Ticker> for Denylist {
    fn from_iter<I: IntoIterator<Item = Ticker>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionFilter {
    sectors: Vec<String>,
    keywords: Vec<String>,
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::from_config(&ExclusionConfig::default())
    }
}

impl ExclusionFilter {
    pub fn from_config(config: &ExclusionConfig) -> Self {
        Self {
            sectors: config.sectors.iter().map(|s| s.trim().to_lowercase()).collect(),
            keywords: config.keywords.iter().map(|k| k.trim().to_lowercase()).collect(),
        }
    }

    pub fn classify(
        &self,
        ticker: &Ticker,
        metadata: Option<&TickerMetadata>,
        release: Option<&ReleaseEvent>,
        denylist: &Denylist,
    ) -> ExclusionVerdict {
        if denylist.contains(ticker) {
            return ExclusionVerdict::exclude(ExclusionReason::Denylist, ticker.as_str());
        }

        let sector = metadata.and_then(|m| m.sector.as_deref());
        if let Some(sector) = sector {
            let normalized = sector.trim().to_lowercase();
            if self.sectors.iter().any(|excluded| *excluded == normalized) {
                return ExclusionVerdict::exclude(ExclusionReason::Sector, sector);
            }
        }

        let industry = metadata.and_then(|m| m.industry.as_deref());
        if let Some(industry) = industry {
            if let Some(keyword) = self.matching_keyword(industry) {
                return ExclusionVerdict::exclude(
                    ExclusionReason::Keyword,
                    format!("industry '{industry}' contains '{keyword}'"),
                );
            }
        }

        if let Some(release) = release {
            if let Some(keyword) = self.matching_keyword(&release.headline) {
                return ExclusionVerdict::exclude(
                    ExclusionReason::Keyword,
                    format!("headline contains '{keyword}'"),
                );
            }
        }

        ExclusionVerdict::included()
    }

    fn matching_keyword(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| haystack.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).expect("valid")
    }

    #[test]
    fn sector_match_ignores_case() {
        let filter = ExclusionFilter::default();
        let metadata = TickerMetadata::new("HEALTH CARE", "Medical Devices");

        let verdict = filter.classify(&ticker("XYZ"), Some(&metadata), None, &Denylist::empty());
        assert!(verdict.excluded);
        assert_eq!(verdict.reason, ExclusionReason::Sector);
        assert_eq!(verdict.detail.as_deref(), Some("HEALTH CARE"));
    }

    #[test]
    fn industry_keyword_is_a_substring_match() {
        let filter = ExclusionFilter::default();
        let metadata = TickerMetadata::new("Basic Materials", "Biotechnology");

        let verdict = filter.classify(&ticker("XYZ"), Some(&metadata), None, &Denylist::empty());
        assert_eq!(verdict.reason, ExclusionReason::Keyword);
    }

    #[test]
    fn industrials_sector_is_not_a_trial_keyword_hit() {
        let filter = ExclusionFilter::default();
        let metadata = TickerMetadata::new("Industrials", "Aerospace & Defense");

        let verdict = filter.classify(&ticker("XYZ"), Some(&metadata), None, &Denylist::empty());
        assert_eq!(verdict, ExclusionVerdict::included());
    }

    #[test]
    fn denylist_collects_unique_tickers() {
        let denylist: Denylist = [ticker("AAA"), ticker("aaa"), ticker("BBB")].into_iter().collect();
        assert_eq!(denylist.len(), 2);
        assert!(denylist.contains(&ticker("AAA")));
    }
}
