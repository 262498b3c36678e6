//! Company-name to ticker lookup for wire items that carry no symbol.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::config::CorrelationConfig;
use crate::{ConfigError, Ticker};

/// Case- and whitespace-insensitive map from issuer name to ticker.
///
/// ```yaml
/// Acme Robotics: ACME
/// "Widget Co.": WDGT
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyNames(HashMap<String, Ticker>);

impl CompanyNames {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads a YAML name-to-ticker map. A missing file yields an empty map.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %origin, "company name map not found, name lookup disabled");
                return Ok(Self::empty());
            }
            Err(source) => return Err(ConfigError::Io { path: origin, source }),
        };
        if content.trim().is_empty() {
            return Ok(Self::empty());
        }

        let raw: HashMap<String, String> =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: origin.clone(),
                source,
            })?;

        let mut names = Self::empty();
        for (name, symbol) in raw {
            let ticker = Ticker::parse(&symbol).map_err(|source| ConfigError::Ticker {
                origin: origin.clone(),
                source,
            })?;
            names.insert(&name, ticker);
        }
        Ok(names)
    }

    pub fn from_config(config: &CorrelationConfig) -> Result<Self, ConfigError> {
        match &config.company_names_path {
            Some(path) => Self::load(path),
            None => Ok(Self::empty()),
        }
    }

    pub fn insert(&mut self, name: &str, ticker: Ticker) {
        let key = normalize(name);
        if !key.is_empty() {
            self.0.insert(key, ticker);
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&Ticker> {
        self.0.get(&normalize(name))
    }

    /// The issuer named by a release headline, trying the name as written and then
    /// without its corporate suffix.
    pub fn resolve_headline(&self, headline: &str) -> Option<Ticker> {
        if self.is_empty() {
            return None;
        }
        name_candidates(headline)
            .iter()
            .find_map(|name| self.resolve(name))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Ticker)> for CompanyNames {
    fn from_iter<I: IntoIterator<Item = (S, Ticker)>>(iter: I) -> Self {
        let mut names = Self::empty();
        for (name, ticker) in iter {
            names.insert(name.as_ref(), ticker);
        }
        names
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

struct NamePatterns {
    attribution: Regex,
    verb: Regex,
    parenthetical: Regex,
    suffix: Regex,
}

fn name_patterns() -> &'static NamePatterns {
    static PATTERNS: OnceLock<NamePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| NamePatterns {
        attribution: Regex::new(
            r"(?i)^[^/]+/\s*(?:PR Newswire|Business Wire|GlobeNewswire|Accesswire)\s*[:/—–-]\s*",
        )
        .expect("attribution pattern is valid"),
        verb: Regex::new(
            r"(?i)\s+(?:Announces?|Reports?|Completes?|Launches?|Signs?|Enters?|Secures?|Receives?|Expands?|Awards?|Selects?|Closes?|Grants?|Appoints?|Acquires?|Partners?|Agrees?|Files?|Achieves?|Confirms?|Updates?|Provides?|Releases?|Presents?|Declares?|Regains?|Executes?)\b",
        )
        .expect("verb pattern is valid"),
        parenthetical: Regex::new(r"\s*\(.*?\)").expect("parenthetical pattern is valid"),
        suffix: Regex::new(
            r"(?i)\b(?:Inc\.?|Corp\.?|Ltd\.?|LLC|L\.L\.C\.?|PLC|Co\.?|Holdings?|Group|Technologies|Technology|Sciences?|Therapeutics|Pharmaceuticals?|Biosciences?|Solutions?|Systems?|Networks?|Enterprises?|International|Worldwide|Global|Capital|Partners?|Acquisition|Acquisitions)\b\.?",
        )
        .expect("suffix pattern is valid"),
    })
}

/// Issuer names a headline may start with: the text before the first
/// announcement verb, then the same text without corporate suffixes.
fn name_candidates(headline: &str) -> Vec<String> {
    let patterns = name_patterns();
    let title = patterns.attribution.replace(headline, "");
    let subject = patterns.verb.splitn(&title, 2).next().unwrap_or_default();
    let raw = patterns
        .parenthetical
        .replace_all(subject.trim(), "")
        .trim()
        .to_owned();

    let stripped = patterns.suffix.replace_all(&raw, "");
    let stripped = stripped.trim().trim_matches(',').trim().to_owned();

    let mut candidates = vec![raw];
    if !stripped.is_empty() && stripped != candidates[0] {
        candidates.push(stripped);
    }
    candidates.retain(|name| name.chars().count() > 2);
    candidates
}
