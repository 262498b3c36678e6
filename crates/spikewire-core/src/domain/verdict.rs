use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{ReleaseEvent, Ticker};

/// Outcome of the dual-ratio volume test for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeVerdict {
    pub is_spike: bool,
    pub volume_ratio_to_median: f64,
    pub volume_ratio_to_mean: f64,
    pub current_volume: u64,
    pub median_volume: f64,
    pub mean_volume: f64,
    pub close: f64,
    /// Close-to-close move in percent against the previous session.
    pub pct_change: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl SpikeVerdict {
    /// Verdict for a window the test could not be applied to.
    pub fn not_evaluable() -> Self {
        Self {
            is_spike: false,
            volume_ratio_to_median: 0.0,
            volume_ratio_to_mean: 0.0,
            current_volume: 0,
            median_volume: 0.0,
            mean_volume: 0.0,
            close: 0.0,
            pct_change: 0.0,
            session: None,
        }
    }
}

/// Why a spike was suppressed, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExclusionReason {
    None,
    Denylist,
    Sector,
    Keyword,
}

impl ExclusionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Denylist => "denylist",
            Self::Sector => "sector",
            Self::Keyword => "keyword",
        }
    }
}

impl Display for ExclusionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionVerdict {
    pub excluded: bool,
    pub reason: ExclusionReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ExclusionVerdict {
    pub fn included() -> Self {
        Self {
            excluded: false,
            reason: ExclusionReason::None,
            detail: None,
        }
    }

    pub fn exclude(reason: ExclusionReason, detail: impl Into<String>) -> Self {
        Self {
            excluded: reason != ExclusionReason::None,
            reason,
            detail: Some(detail.into()),
        }
    }
}

/// A ticker that went through the full pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ticker: Ticker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub spike_verdict: SpikeVerdict,
    pub release_event: Option<ReleaseEvent>,
    pub exclusion_verdict: ExclusionVerdict,
}

impl Candidate {
    /// Only unexcluded spikes are forwarded to alerting and reporting.
    pub fn is_alertable(&self) -> bool {
        self.spike_verdict.is_spike && !self.exclusion_verdict.excluded
    }

    pub fn display_name(&self) -> &str {
        self.company.as_deref().unwrap_or(self.ticker.as_str())
    }
}
