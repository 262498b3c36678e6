use time::Date;

use crate::{Ticker, ValidationError};

/// One daily session for a ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBar {
    pub date: Date,
    pub close: f64,
    pub volume: u64,
}

impl DailyBar {
    pub fn new(date: Date, close: f64, volume: u64) -> Result<Self, ValidationError> {
        if !close.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "close" });
        }
        if close < 0.0 {
            return Err(ValidationError::NegativeValue { field: "close" });
        }

        Ok(Self {
            date,
            close,
            volume,
        })
    }
}

/// Date-ascending daily bars for one ticker; the last bar is the session under evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryWindow {
    pub ticker: Ticker,
    bars: Vec<DailyBar>,
}

impl HistoryWindow {
    /// Builds a window, rejecting bars that are not in strictly ascending date order.
    pub fn new(ticker: Ticker, bars: Vec<DailyBar>) -> Result<Self, ValidationError> {
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(ValidationError::UnorderedHistory {
                    index: index + 1,
                    date: pair[1].date.to_string(),
                });
            }
        }

        Ok(Self { ticker, bars })
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The session being evaluated.
    pub fn current(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    /// Up to `lookback` sessions immediately before the current one, oldest first.
    pub fn trailing(&self, lookback: usize) -> &[DailyBar] {
        let Some(end) = self.bars.len().checked_sub(1) else {
            return &[];
        };
        let start = end.saturating_sub(lookback);
        &self.bars[start..end]
    }

    /// The window as it stood after the close of `date`; later bars are dropped.
    pub fn through(&self, date: Date) -> Self {
        let end = self.bars.partition_point(|bar| bar.date <= date);
        Self {
            ticker: self.ticker.clone(),
            bars: self.bars[..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn ticker() -> Ticker {
        Ticker::parse("XYZ").expect("valid ticker")
    }

    #[test]
    fn rejects_out_of_order_bars() {
        let bars = vec![
            DailyBar::new(date!(2026 - 01 - 28), 10.0, 100).expect("bar"),
            DailyBar::new(date!(2026 - 01 - 27), 10.0, 100).expect("bar"),
        ];

        let err = HistoryWindow::new(ticker(), bars).expect_err("must fail");
        assert!(matches!(err, ValidationError::UnorderedHistory { index: 1, .. }));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let bars = vec![
            DailyBar::new(date!(2026 - 01 - 28), 10.0, 100).expect("bar"),
            DailyBar::new(date!(2026 - 01 - 28), 11.0, 200).expect("bar"),
        ];

        assert!(HistoryWindow::new(ticker(), bars).is_err());
    }

    #[test]
    fn trailing_excludes_current_session() {
        let bars = vec![
            DailyBar::new(date!(2026 - 01 - 26), 10.0, 1).expect("bar"),
            DailyBar::new(date!(2026 - 01 - 27), 10.0, 2).expect("bar"),
            DailyBar::new(date!(2026 - 01 - 28), 10.0, 3).expect("bar"),
        ];
        let window = HistoryWindow::new(ticker(), bars).expect("ordered");

        let trailing = window.trailing(5);
        assert_eq!(trailing.len(), 2);
        assert_eq!(trailing[1].volume, 2);
        assert_eq!(window.current().map(|bar| bar.volume), Some(3));
        assert_eq!(window.trailing(1)[0].volume, 2);
    }

    #[test]
    fn through_drops_sessions_after_the_date() {
        let bars = vec![
            DailyBar::new(date!(2026 - 01 - 26), 10.0, 1).expect("bar"),
            DailyBar::new(date!(2026 - 01 - 27), 10.0, 2).expect("bar"),
            DailyBar::new(date!(2026 - 01 - 29), 10.0, 3).expect("bar"),
        ];
        let window = HistoryWindow::new(ticker(), bars).expect("ordered");

        let as_of = window.through(date!(2026 - 01 - 28));
        assert_eq!(as_of.len(), 2);
        assert_eq!(as_of.current().map(|bar| bar.volume), Some(2));
        assert_eq!(window.through(date!(2026 - 01 - 29)).len(), 3);
        assert!(window.through(date!(2025 - 12 - 31)).is_empty());
    }

    #[test]
    fn rejects_non_finite_close() {
        let err = DailyBar::new(date!(2026 - 01 - 28), f64::NAN, 1).expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFiniteValue { field: "close" }));
    }
}
