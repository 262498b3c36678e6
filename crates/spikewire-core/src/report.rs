//! Daily report artifacts: `daily_report.json` for machines and
//! `daily_report.md` for people.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::pipeline::{Outcome, RunReport, RunStats};
use crate::{Candidate, ExclusionVerdict, ReportError, SpikeVerdict, Ticker, UtcDateTime};

pub const JSON_REPORT_FILE: &str = "daily_report.json";
pub const MARKDOWN_REPORT_FILE: &str = "daily_report.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: Uuid,
    reference_time: UtcDateTime,
    stats: RunStats,
    candidates: &'a [Candidate],
    evaluations: Vec<EvaluationRecord<'a>>,
}

#[derive(Serialize)]
struct EvaluationRecord<'a> {
    ticker: &'a Ticker,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    spike: Option<&'a SpikeVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclusion: Option<&'a ExclusionVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorRecord>,
}

#[derive(Serialize)]
struct ErrorRecord {
    code: &'static str,
    message: String,
}

pub fn render_json(report: &RunReport) -> Result<String, ReportError> {
    let evaluations = report
        .evaluations
        .iter()
        .map(|evaluation| {
            let mut record = EvaluationRecord {
                ticker: &evaluation.ticker,
                status: "",
                spike: None,
                exclusion: None,
                error: None,
            };
            match &evaluation.outcome {
                Outcome::NotSpike(verdict) => {
                    record.status = "not_spike";
                    record.spike = Some(verdict);
                }
                Outcome::Excluded(candidate) => {
                    record.status = "excluded";
                    record.spike = Some(&candidate.spike_verdict);
                    record.exclusion = Some(&candidate.exclusion_verdict);
                }
                Outcome::Candidate(candidate) => {
                    record.status = "candidate";
                    record.spike = Some(&candidate.spike_verdict);
                    record.exclusion = Some(&candidate.exclusion_verdict);
                }
                Outcome::Failed(error) => {
                    record.status = "failed";
                    record.error = Some(ErrorRecord {
                        code: error.code(),
                        message: error.to_string(),
                    });
                }
            }
            record
        })
        .collect();

    let document = JsonReport {
        run_id: report.run_id,
        reference_time: report.reference_time,
        stats: report.stats,
        candidates: &report.candidates,
        evaluations,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn render_markdown(report: &RunReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();
    let _ = writeln!(out, "# Daily Spike Report\n");
    let _ = writeln!(out, "**Date:** {}  ", report.reference_time.date());
    let _ = writeln!(out, "**Run:** {}  ", report.run_id);
    let _ = writeln!(
        out,
        "**Stats:** scanned {} · spikes {} · excluded {} · alerts {} · with PR {} · unevaluable {}\n",
        stats.scanned,
        stats.spikes,
        stats.excluded,
        stats.candidates,
        stats.with_release,
        stats.unevaluable
    );

    let _ = writeln!(out, "## Alerts\n");
    if report.candidates.is_empty() {
        let _ = writeln!(out, "_No alerts today._");
    }
    for candidate in &report.candidates {
        let verdict = &candidate.spike_verdict;
        let _ = write!(out, "- **{}**", candidate.ticker);
        if let Some(company) = &candidate.company {
            let _ = write!(out, " ({company})");
        }
        let _ = writeln!(
            out,
            ": {:.1}x Vol, {:+.2}% Price",
            verdict.volume_ratio_to_median, verdict.pct_change
        );
        match &candidate.release_event {
            Some(release) => match &release.url {
                Some(url) => {
                    let _ = writeln!(out, "  - [{}]({})", release.headline, url);
                }
                None => {
                    let _ = writeln!(out, "  - {}", release.headline);
                }
            },
            None => {
                let _ = writeln!(out, "  - no press release found");
            }
        }
    }

    let excluded: Vec<&Candidate> = report
        .evaluations
        .iter()
        .filter_map(|evaluation| match &evaluation.outcome {
            Outcome::Excluded(candidate) => Some(candidate),
            _ => None,
        })
        .collect();
    if !excluded.is_empty() {
        let _ = writeln!(out, "\n## Excluded\n");
        for candidate in excluded {
            let verdict = &candidate.exclusion_verdict;
            let _ = write!(
                out,
                "- **{}**: {:.1}x Vol, {}",
                candidate.ticker, candidate.spike_verdict.volume_ratio_to_median, verdict.reason
            );
            match &verdict.detail {
                Some(detail) => {
                    let _ = writeln!(out, " ({detail})");
                }
                None => {
                    let _ = writeln!(out);
                }
            }
        }
    }

    out
}

/// Writes both artifacts into `dir`, creating it if needed.
pub fn write_reports(report: &RunReport, dir: impl AsRef<Path>) -> Result<ReportPaths, ReportError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let paths = ReportPaths {
        json: dir.join(JSON_REPORT_FILE),
        markdown: dir.join(MARKDOWN_REPORT_FILE),
    };
    write_file(&paths.json, &render_json(report)?)?;
    write_file(&paths.markdown, &render_markdown(report))?;

    info!(
        json = %paths.json.display(),
        markdown = %paths.markdown.display(),
        "wrote daily reports"
    );
    Ok(paths)
}

fn write_file(path: &Path, content: &str) -> Result<(), ReportError> {
    std::fs::write(path, content).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}
