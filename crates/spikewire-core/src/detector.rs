//! Dual-ratio volume spike test.
//!
//! A session is a spike when its volume is strictly above `median_multiple` times
//! the trailing median **and** strictly above `mean_multiple` times the trailing
//! mean. The current session is never part of its own baseline.

use crate::config::ThresholdConfig;
use crate::{HistoryWindow, SpikeError, SpikeVerdict};

#[derive(Debug, Clone, PartialEq)]
pub struct SpikeDetector {
    median_multiple: f64,
    mean_multiple: f64,
    lookback: usize,
    min_abs_volume: u64,
    min_abs_pct_move: f64,
    min_baseline_volume: f64,
}

impl Default for SpikeDetector {
    fn default() -> Self {
        Self::from_config(&ThresholdConfig::default())
    }
}

impl SpikeDetector {
    pub fn from_config(config: &ThresholdConfig) -> Self {
        Self {
            median_multiple: config.volume_multiple_median,
            mean_multiple: config.volume_multiple_mean,
            lookback: config.lookback_days,
            min_abs_volume: config.min_abs_volume,
            min_abs_pct_move: config.min_abs_pct_move,
            min_baseline_volume: config.min_baseline_volume as f64,
        }
    }

    pub const fn lookback(&self) -> usize {
        self.lookback
    }

    /// Bars a provider must supply for the test to be applicable.
    pub const fn required_sessions(&self) -> usize {
        self.lookback + 1
    }

    /// Spike verdict for the last session of `history`. Windows that are too short
    /// yield a non-spike verdict rather than an error.
    pub fn evaluate(&self, history: &HistoryWindow) -> SpikeVerdict {
        self.check(history)
            .unwrap_or_else(|_| SpikeVerdict::not_evaluable())
    }

    /// Like [`evaluate`](Self::evaluate), but reports why a window could not be tested.
    pub fn check(&self, history: &HistoryWindow) -> Result<SpikeVerdict, SpikeError> {
        let available = history.len().saturating_sub(1);
        let current = match history.current() {
            Some(current) if available >= self.lookback => current,
            _ => {
                return Err(SpikeError::InsufficientHistory {
                    required: self.lookback,
                    available,
                })
            }
        };
        let trailing = history.trailing(self.lookback);
        let volumes: Vec<f64> = trailing.iter().map(|bar| bar.volume as f64).collect();

        let median_volume = median(&volumes);
        let mean_volume = mean(&volumes);
        let current_volume = current.volume as f64;

        let volume_ratio_to_median = self.ratio(current_volume, median_volume);
        let volume_ratio_to_mean = self.ratio(current_volume, mean_volume);

        let pct_change = trailing
            .last()
            .map(|previous| percent_change(previous.close, current.close))
            .unwrap_or(0.0);

        let exceeds_both = matches!(
            (volume_ratio_to_median, volume_ratio_to_mean),
            (Some(to_median), Some(to_mean))
                if to_median > self.median_multiple && to_mean > self.mean_multiple
        );
        let liquid = current.volume >= self.min_abs_volume;
        let moved = pct_change.abs() >= self.min_abs_pct_move;

        Ok(SpikeVerdict {
            is_spike: exceeds_both && liquid && moved,
            volume_ratio_to_median: volume_ratio_to_median.unwrap_or(0.0),
            volume_ratio_to_mean: volume_ratio_to_mean.unwrap_or(0.0),
            current_volume: current.volume,
            median_volume,
            mean_volume,
            close: current.close,
            pct_change,
            session: Some(current.date.to_string()),
        })
    }

    /// `None` when the baseline is below `min_baseline_volume`, zero or not finite.
    fn ratio(&self, current: f64, baseline: f64) -> Option<f64> {
        if baseline < self.min_baseline_volume {
            return None;
        }
        safe_ratio(current, baseline)
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `None` when the denominator is zero or the result is not finite (halted or
/// illiquid names).
fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator <= 0.0 || !denominator.is_finite() {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}

fn percent_change(previous: f64, current: f64) -> f64 {
    if previous <= 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DailyBar, Ticker};
    use time::{Date, Duration, Month};

    fn window(volumes: &[u64]) -> HistoryWindow {
        let start = Date::from_calendar_date(2026, Month::January, 1).expect("valid date");
        let bars = volumes
            .iter()
            .enumerate()
            .map(|(offset, volume)| {
                DailyBar::new(start + Duration::days(offset as i64), 100.0, *volume)
                    .expect("valid bar")
            })
            .collect();
        HistoryWindow::new(Ticker::parse("XYZ").expect("valid"), bars).expect("ordered")
    }

    fn flat_then(current: u64) -> HistoryWindow {
        let mut volumes = vec![1_000_000; 20];
        volumes.push(current);
        window(&volumes)
    }

    #[test]
    fn five_times_median_is_a_spike() {
        let verdict = SpikeDetector::default().evaluate(&flat_then(5_000_000));
        assert!(verdict.is_spike);
        assert_eq!(verdict.volume_ratio_to_median, 5.0);
        assert_eq!(verdict.volume_ratio_to_mean, 5.0);
        assert_eq!(verdict.current_volume, 5_000_000);
    }

    #[test]
    fn nineteen_prior_sessions_is_not_evaluable() {
        let mut volumes = vec![1_000_000; 19];
        volumes.push(9_000_000);
        let history = window(&volumes);

        let detector = SpikeDetector::default();
        assert!(!detector.evaluate(&history).is_spike);
        assert_eq!(
            detector.check(&history),
            Err(SpikeError::InsufficientHistory {
                required: 20,
                available: 19
            })
        );
    }

    #[test]
    fn median_boundary_is_exclusive() {
        let detector = SpikeDetector::default();
        assert!(!detector.evaluate(&flat_then(3_000_000)).is_spike);
        assert!(detector.evaluate(&flat_then(3_010_000)).is_spike);
    }

    #[test]
    fn mean_boundary_is_exclusive() {
        // Median 1,000,000 and mean 1,450,000.
        let mut trailing = vec![1_000_000; 11];
        trailing.extend(vec![2_000_000; 9]);

        let mut at_boundary = trailing.clone();
        at_boundary.push(3_625_000);
        let verdict = SpikeDetector::default().evaluate(&window(&at_boundary));
        assert_eq!(verdict.median_volume, 1_000_000.0);
        assert_eq!(verdict.mean_volume, 1_450_000.0);
        assert_eq!(verdict.volume_ratio_to_mean, 2.5);
        assert!(verdict.volume_ratio_to_median > 3.0);
        assert!(!verdict.is_spike);

        let mut above = trailing;
        above.push(3_639_500);
        assert!(SpikeDetector::default().evaluate(&window(&above)).is_spike);
    }

    #[test]
    fn both_ratios_are_required() {
        // A single huge day drags the mean above current/2.5 while the median stays low.
        let mut volumes = vec![1_000_000; 19];
        volumes.push(40_000_000);
        volumes.push(4_000_000);

        let verdict = SpikeDetector::default().evaluate(&window(&volumes));
        assert!(verdict.volume_ratio_to_median > 3.0);
        assert!(verdict.volume_ratio_to_mean <= 2.5);
        assert!(!verdict.is_spike);
    }

    #[test]
    fn zero_trailing_volume_is_not_a_spike() {
        let mut volumes = vec![0; 20];
        volumes.push(1_000_000);

        let verdict = SpikeDetector::default().evaluate(&window(&volumes));
        assert!(!verdict.is_spike);
        assert_eq!(verdict.volume_ratio_to_median, 0.0);
        assert_eq!(verdict.volume_ratio_to_mean, 0.0);
    }

    #[test]
    fn near_zero_baseline_is_not_a_spike() {
        let mut volumes = vec![1; 20];
        volumes.push(10);

        let verdict = SpikeDetector::default().evaluate(&window(&volumes));
        assert!(!verdict.is_spike);
        assert_eq!(verdict.volume_ratio_to_median, 0.0);
        assert_eq!(verdict.current_volume, 10);
    }

    #[test]
    fn baseline_floor_is_configurable() {
        let mut volumes = vec![1; 20];
        volumes.push(10);
        let config = ThresholdConfig {
            min_baseline_volume: 0,
            ..ThresholdConfig::default()
        };

        let verdict = SpikeDetector::from_config(&config).evaluate(&window(&volumes));
        assert!(verdict.is_spike);
        assert_eq!(verdict.volume_ratio_to_median, 10.0);
    }

    #[test]
    fn liquidity_floor_suppresses_thin_names() {
        let config = ThresholdConfig {
            min_abs_volume: 10_000,
            ..ThresholdConfig::default()
        };
        let mut volumes = vec![2_000; 20];
        volumes.push(8_000);

        assert!(!SpikeDetector::from_config(&config).evaluate(&window(&volumes)).is_spike);
        assert!(SpikeDetector::default().evaluate(&window(&volumes)).is_spike);
    }

    #[test]
    fn only_trailing_lookback_is_used() {
        // Older sessions beyond the lookback must not influence the baseline.
        let mut volumes = vec![50_000_000; 5];
        volumes.extend(vec![1_000_000; 20]);
        volumes.push(4_000_000);

        let verdict = SpikeDetector::default().evaluate(&window(&volumes));
        assert_eq!(verdict.median_volume, 1_000_000.0);
        assert!(verdict.is_spike);
    }
}
