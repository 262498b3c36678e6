//! Universe and ticker-list loading.

use std::collections::HashSet;
use std::path::Path;

use crate::config::{UniverseConfig, UniverseMode};
use crate::{ConfigError, Ticker};

/// Resolves the configured universe to an ordered, de-duplicated ticker list.
pub fn load_universe(config: &UniverseConfig) -> Result<Vec<Ticker>, ConfigError> {
    let tickers = match config.mode {
        UniverseMode::Watchlist => parse_entries(
            config.watchlist.iter().map(String::as_str),
            "universe.watchlist",
        )?,
        UniverseMode::File => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| ConfigError::invalid("universe.path", "required when universe.mode is 'file'"))?;
            read_ticker_file(path)?
        }
    };

    if tickers.is_empty() {
        return Err(ConfigError::invalid("universe", "no tickers to scan"));
    }
    Ok(tickers)
}

/// Reads a one-ticker-per-line file. Blank lines and `#` comments are skipped.
pub fn read_ticker_file(path: &Path) -> Result<Vec<Ticker>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_ticker_lines(&content, &path.display().to_string())
}

pub(crate) fn parse_ticker_lines(content: &str, origin: &str) -> Result<Vec<Ticker>, ConfigError> {
    let entries = content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default());
    parse_entries(entries, origin)
}

fn parse_entries<'a>(
    entries: impl Iterator<Item = &'a str>,
    origin: &str,
) -> Result<Vec<Ticker>, ConfigError> {
    let mut seen = HashSet::new();
    let mut tickers = Vec::new();
    for entry in entries {
        if entry.trim().is_empty() {
            continue;
        }
        let ticker = Ticker::parse(entry).map_err(|source| ConfigError::Ticker {
            origin: origin.to_owned(),
            source,
        })?;
        if seen.insert(ticker.clone()) {
            tickers.push(ticker);
        }
    }
    Ok(tickers)
}
