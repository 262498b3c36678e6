//! Alert dispatch.
//!
//! The pipeline hands surviving candidates to an [`AlertDispatcher`]. Delivery
//! problems are returned to the caller, which logs them; they never change the
//! run's outcome.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::http_client::{HttpClient, HttpRequest};
use crate::pipeline::RunStats;
use crate::{Candidate, NotifyError};

/// Slack caps a section's text at 3000 characters.
const SECTION_LIMIT: usize = 3000;

pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

pub trait AlertDispatcher: Send + Sync {
    fn name(&self) -> &str;

    fn dispatch<'a>(&'a self, candidates: &'a [Candidate], stats: &'a RunStats) -> DispatchFuture<'a>;
}

/// Posts one Block Kit message to an incoming webhook. Runs without candidates
/// send nothing.
pub struct SlackNotifier {
    http: Arc<dyn HttpClient>,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(http: Arc<dyn HttpClient>, webhook_url: impl Into<String>) -> Self {
        Self {
            http,
            webhook_url: webhook_url.into(),
        }
    }

    async fn post(&self, candidates: &[Candidate], stats: &RunStats) -> Result<(), NotifyError> {
        if candidates.is_empty() {
            info!("no candidates, skipping slack message");
            return Ok(());
        }

        let body = serde_json::to_string(&slack_payload(candidates, stats))?;
        let request = HttpRequest::post(&self.webhook_url).with_json_body(body);
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| NotifyError::Transport(e.message().to_owned()))?;
        if !response.is_success() {
            return Err(NotifyError::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        info!(candidates = candidates.len(), "posted slack alert");
        Ok(())
    }
}

impl AlertDispatcher for SlackNotifier {
    fn name(&self) -> &str {
        "slack"
    }

    fn dispatch<'a>(&'a self, candidates: &'a [Candidate], stats: &'a RunStats) -> DispatchFuture<'a> {
        Box::pin(self.post(candidates, stats))
    }
}

/// Logs each candidate instead of sending anything. Used for dry runs and when
/// no webhook is configured.
#[derive(Debug, Default)]
pub struct LogDispatcher;

impl AlertDispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    fn dispatch<'a>(&'a self, candidates: &'a [Candidate], stats: &'a RunStats) -> DispatchFuture<'a> {
        Box::pin(async move {
            for candidate in candidates {
                info!(alert = %alert_line(candidate), "alert (not sent)");
            }
            info!(
                candidates = stats.candidates,
                scanned = stats.scanned,
                "alert dispatch skipped"
            );
            Ok(())
        })
    }
}

/// Block Kit body: a heading, one bullet per candidate, and a stats footer.
pub fn slack_payload(candidates: &[Candidate], stats: &RunStats) -> Value {
    let mut blocks = vec![
        json!({
            "type": "section",
            "text": {"type": "mrkdwn", "text": "*Here are the volume-spiking PRs of the day:*"}
        }),
        json!({"type": "divider"}),
    ];

    let mut section = String::new();
    for line in candidates.iter().map(alert_line) {
        if !section.is_empty() && section.len() + line.len() + 1 > SECTION_LIMIT {
            blocks.push(mrkdwn_section(&section));
            section.clear();
        }
        section.push_str(&line);
        section.push('\n');
    }
    if !section.is_empty() {
        blocks.push(mrkdwn_section(&section));
    }

    blocks.push(json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!(
                "Scanned {} · spikes {} · excluded {} · alerts {} · unevaluable {}",
                stats.scanned, stats.spikes, stats.excluded, stats.candidates, stats.unevaluable
            )
        }]
    }));

    json!({ "blocks": blocks })
}

/// `• Company | *TICKER* | 4.0x Vol | <url|headline>`
pub fn alert_line(candidate: &Candidate) -> String {
    let release = match &candidate.release_event {
        Some(release) => match &release.url {
            Some(url) => format!("<{}|{}>", url, escape_link_text(&release.headline)),
            None => escape(&release.headline),
        },
        None => String::from("_no press release found_"),
    };

    format!(
        "• {} | *{}* | {:.1}x Vol | {}",
        escape(candidate.display_name()),
        candidate.ticker,
        candidate.spike_verdict.volume_ratio_to_median,
        release
    )
}

fn mrkdwn_section(text: &str) -> Value {
    json!({"type": "section", "text": {"type": "mrkdwn", "text": text}})
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_link_text(text: &str) -> String {
    escape(text).replace('|', "-")
}
