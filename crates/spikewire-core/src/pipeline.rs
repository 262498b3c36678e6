//! Per-ticker orchestration: history → spike test → release match → exclusion.
//!
//! The session under test is the last bar dated on or before the reference time's
//! UTC date, so a past reference time replays that day end to end.
//!
//! Every ticker is evaluated on its own task and produces exactly one
//! [`Evaluation`]. Failures stay inside that evaluation; a run always completes.
//! Results are collected by universe index, so output order never depends on
//! which task finished first.
//!
//! ```rust,ignore
//! let pipeline = Pipeline::new(&config, collaborators, denylist);
//! let report = pipeline.run(&universe, UtcDateTime::now()).await;
//! for candidate in &report.candidates {
//!     println!("{} {:.1}x", candidate.ticker, candidate.spike_verdict.volume_ratio_to_median);
//! }
//! ```

use std::sync::Arc;

use serde::Serialize;
use time::Date;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::data_source::{FeedSource, MarketDataSource, MetadataSource};
use crate::exclusion::{Denylist, ExclusionFilter};
use crate::{
    Candidate, EvaluationError, FeedMatcher, SpikeDetector, SpikeVerdict, Ticker, UtcDateTime,
};

/// External collaborators a pipeline reads from.
#[derive(Clone)]
pub struct Collaborators {
    pub market_data: Arc<dyn MarketDataSource>,
    /// Priority order: primary first.
    pub feeds: Vec<Arc<dyn FeedSource>>,
    pub metadata: Arc<dyn MetadataSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// History was evaluated and the session is not a spike.
    NotSpike(SpikeVerdict),
    /// A spike suppressed by the exclusion filter.
    Excluded(Candidate),
    /// A spike that survived filtering.
    Candidate(Candidate),
    /// The ticker could not be evaluated.
    Failed(EvaluationError),
}

/// Result of evaluating one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub ticker: Ticker,
    pub outcome: Outcome,
}

impl Evaluation {
    fn failed(ticker: Ticker, error: EvaluationError) -> Self {
        Self {
            ticker,
            outcome: Outcome::Failed(error),
        }
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        match &self.outcome {
            Outcome::Candidate(candidate) => Some(candidate),
            _ => None,
        }
    }

    pub fn is_spike(&self) -> bool {
        matches!(self.outcome, Outcome::Excluded(_) | Outcome::Candidate(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub scanned: usize,
    pub spikes: usize,
    pub excluded: usize,
    pub candidates: usize,
    pub with_release: usize,
    pub unevaluable: usize,
}

impl RunStats {
    fn tally(evaluations: &[Evaluation]) -> Self {
        let mut stats = Self {
            scanned: evaluations.len(),
            ..Self::default()
        };
        for evaluation in evaluations {
            match &evaluation.outcome {
                Outcome::NotSpike(_) => {}
                Outcome::Excluded(_) => {
                    stats.spikes += 1;
                    stats.excluded += 1;
                }
                Outcome::Candidate(candidate) => {
                    stats.spikes += 1;
                    stats.candidates += 1;
                    if candidate.release_event.is_some() {
                        stats.with_release += 1;
                    }
                }
                Outcome::Failed(_) => stats.unevaluable += 1,
            }
        }
        stats
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub reference_time: UtcDateTime,
    pub stats: RunStats,
    /// Alertable candidates in universe order.
    pub candidates: Vec<Candidate>,
    /// One entry per universe ticker, in universe order.
    pub evaluations: Vec<Evaluation>,
}

impl RunReport {
    fn new(reference_time: UtcDateTime, evaluations: Vec<Evaluation>) -> Self {
        let candidates = evaluations
            .iter()
            .filter_map(Evaluation::candidate)
            .cloned()
            .collect();
        Self {
            run_id: Uuid::new_v4(),
            reference_time,
            stats: RunStats::tally(&evaluations),
            candidates,
            evaluations,
        }
    }
}

#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    market_data: Arc<dyn MarketDataSource>,
    metadata: Arc<dyn MetadataSource>,
    detector: SpikeDetector,
    matcher: FeedMatcher,
    filter: ExclusionFilter,
    denylist: Denylist,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(config: &ScanConfig, collaborators: Collaborators, denylist: Denylist) -> Self {
        let Collaborators {
            market_data,
            feeds,
            metadata,
        } = collaborators;

        Self {
            inner: Arc::new(PipelineInner {
                market_data,
                metadata,
                detector: SpikeDetector::from_config(&config.thresholds),
                matcher: FeedMatcher::new(feeds, &config.correlation),
                filter: ExclusionFilter::from_config(&config.exclusions),
                denylist,
                concurrency: config.pipeline.concurrency.max(1),
            }),
        }
    }

    pub fn denylist(&self) -> &Denylist {
        &self.inner.denylist
    }

    /// Alertable candidates only, in universe order.
    pub async fn candidates(&self, universe: &[Ticker], reference_time: UtcDateTime) -> Vec<Candidate> {
        self.run(universe, reference_time).await.candidates
    }

    pub async fn run(&self, universe: &[Ticker], reference_time: UtcDateTime) -> RunReport {
        info!(
            tickers = universe.len(),
            concurrency = self.inner.concurrency,
            reference_time = %reference_time,
            "scan started"
        );

        let permits = Arc::new(Semaphore::new(self.inner.concurrency));
        let handles: Vec<_> = universe
            .iter()
            .cloned()
            .map(|ticker| {
                let inner = Arc::clone(&self.inner);
                let permits = Arc::clone(&permits);
                let task_ticker = ticker.clone();
                let handle = tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok();
                    inner.evaluate(task_ticker, reference_time).await
                });
                (ticker, handle)
            })
            .collect();

        let mut evaluations = Vec::with_capacity(handles.len());
        for (ticker, handle) in handles {
            let evaluation = match handle.await {
                Ok(evaluation) => evaluation,
                Err(join_error) => {
                    error!(ticker = %ticker, error = %join_error, "evaluation task aborted");
                    Evaluation::failed(ticker, EvaluationError::Aborted(join_error.to_string()))
                }
            };
            evaluations.push(evaluation);
        }

        let report = RunReport::new(reference_time, evaluations);
        info!(
            run_id = %report.run_id,
            scanned = report.stats.scanned,
            spikes = report.stats.spikes,
            excluded = report.stats.excluded,
            candidates = report.stats.candidates,
            unevaluable = report.stats.unevaluable,
            "scan finished"
        );
        report
    }
}

impl PipelineInner {
    async fn evaluate(&self, ticker: Ticker, reference_time: UtcDateTime) -> Evaluation {
        let session = reference_time.date();
        // A replayed session needs enough history to reach back past it.
        let sessions = self.detector.required_sessions() + days_since(session);
        let history = match self.market_data.history(&ticker, sessions).await {
            Ok(history) => history,
            Err(source) => {
                warn!(
                    ticker = %ticker,
                    provider = self.market_data.name(),
                    code = source.code(),
                    error = %source,
                    "history unavailable"
                );
                return Evaluation::failed(ticker, EvaluationError::HistoryUnavailable(source));
            }
        };

        let history = if history.current().is_some_and(|bar| bar.date > session) {
            debug!(ticker = %ticker, session = %session, "dropping sessions after the reference date");
            history.through(session)
        } else {
            history
        };

        let verdict = match self.detector.check(&history) {
            Ok(verdict) => verdict,
            Err(error) => {
                debug!(ticker = %ticker, error = %error, "not evaluable");
                return Evaluation::failed(ticker, error.into());
            }
        };

        if !verdict.is_spike {
            return Evaluation {
                ticker,
                outcome: Outcome::NotSpike(verdict),
            };
        }

        info!(
            ticker = %ticker,
            ratio_to_median = verdict.volume_ratio_to_median,
            ratio_to_mean = verdict.volume_ratio_to_mean,
            "volume spike"
        );

        let release = self.matcher.find_release(&ticker, reference_time).await;

        let metadata = match self.metadata.metadata(&ticker).await {
            Ok(metadata) => Some(metadata),
            Err(error) => {
                warn!(
                    ticker = %ticker,
                    provider = self.metadata.name(),
                    error = %error,
                    "metadata missing, classifying without sector or industry"
                );
                None
            }
        };

        let exclusion =
            self.filter
                .classify(&ticker, metadata.as_ref(), release.as_ref(), &self.denylist);

        let candidate = Candidate {
            ticker: ticker.clone(),
            company: metadata.and_then(|metadata| metadata.name),
            spike_verdict: verdict,
            release_event: release,
            exclusion_verdict: exclusion,
        };

        let outcome = if candidate.exclusion_verdict.excluded {
            info!(
                ticker = %ticker,
                reason = %candidate.exclusion_verdict.reason,
                "spike excluded"
            );
            Outcome::Excluded(candidate)
        } else {
            Outcome::Candidate(candidate)
        };

        Evaluation { ticker, outcome }
    }
}

/// Calendar days from `date` to today; zero for today or a future date.
fn days_since(date: Date) -> usize {
    let elapsed = (UtcDateTime::now().date() - date).whole_days();
    usize::try_from(elapsed).unwrap_or(0)
}
