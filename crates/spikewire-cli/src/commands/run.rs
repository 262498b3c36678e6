use std::path::Path;
use std::sync::Arc;

use spikewire_core::adapters::{
    CompanyNames, GoogleNewsFeed, WireFeed, YahooMarketData, YahooMetadata, YahooSession,
};
use spikewire_core::{
    load_universe, write_reports, AlertDispatcher, Collaborators, ConfigError, Denylist,
    FeedSource, HttpClient, LogDispatcher, Pipeline, ReqwestHttpClient, RequestThrottle,
    ScanConfig, SlackNotifier, UtcDateTime,
};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;

pub async fn execute(config_path: &Path, args: &RunArgs) -> Result<(), CliError> {
    let mut config = ScanConfig::load(config_path)?;
    apply_overrides(&mut config, args)?;

    let reference_time = match &args.as_of {
        Some(raw) => UtcDateTime::parse(raw)?,
        None => UtcDateTime::now(),
    };

    let denylist = Denylist::from_config(&config.exclusions)?;
    let universe = load_universe(&config.universe)?;
    let company_names = CompanyNames::from_config(&config.correlation)?;
    info!(
        config = %config_path.display(),
        tickers = universe.len(),
        denylisted = denylist.len(),
        company_names = company_names.len(),
        dry_run = args.dry_run,
        "configuration loaded"
    );

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let session = YahooSession::new(
        Arc::clone(&http),
        RequestThrottle::per_second(config.pipeline.requests_per_second),
    );
    let feeds: Vec<Arc<dyn FeedSource>> = vec![
        Arc::new(WireFeed::new(Arc::clone(&http)).with_company_names(company_names)),
        Arc::new(GoogleNewsFeed::new(Arc::clone(&http))),
    ];
    let collaborators = Collaborators {
        market_data: Arc::new(YahooMarketData::new(session.clone())),
        feeds,
        metadata: Arc::new(YahooMetadata::new(session)),
    };

    let pipeline = Pipeline::new(&config, collaborators, denylist);
    let report = pipeline.run(&universe, reference_time).await;

    let dispatcher = dispatcher(&config, args.dry_run, Arc::clone(&http));
    if let Err(error) = dispatcher.dispatch(&report.candidates, &report.stats).await {
        warn!(dispatcher = dispatcher.name(), error = %error, "alert delivery failed");
    }

    let paths = write_reports(&report, &config.report.out_dir)?;

    println!(
        "scanned {} · spikes {} · excluded {} · alerts {} · unevaluable {}",
        report.stats.scanned,
        report.stats.spikes,
        report.stats.excluded,
        report.stats.candidates,
        report.stats.unevaluable
    );
    println!("report: {}", paths.markdown.display());
    Ok(())
}

fn apply_overrides(config: &mut ScanConfig, args: &RunArgs) -> Result<(), ConfigError> {
    if let Some(out_dir) = &args.out_dir {
        config.report.out_dir = out_dir.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    config.validate()
}

fn dispatcher(config: &ScanConfig, dry_run: bool, http: Arc<dyn HttpClient>) -> Box<dyn AlertDispatcher> {
    if dry_run {
        return Box::new(LogDispatcher);
    }

    match std::env::var(&config.slack.webhook_env_var) {
        Ok(url) if !url.trim().is_empty() => Box::new(SlackNotifier::new(http, url.trim())),
        _ => {
            warn!(
                env_var = %config.slack.webhook_env_var,
                "slack webhook not set, logging alerts instead"
            );
            Box::new(LogDispatcher)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(concurrency: Option<usize>) -> RunArgs {
        RunArgs {
            dry_run: true,
            as_of: None,
            out_dir: Some("reports".into()),
            concurrency,
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = ScanConfig::default();
        apply_overrides(&mut config, &args(Some(2))).expect("valid");
        assert_eq!(config.pipeline.concurrency, 2);
        assert_eq!(config.report.out_dir, std::path::PathBuf::from("reports"));
    }

    #[test]
    fn out_of_range_concurrency_overrides_are_rejected() {
        for concurrency in [0, usize::MAX] {
            let mut config = ScanConfig::default();
            let error = apply_overrides(&mut config, &args(Some(concurrency))).expect_err("must fail");
            assert!(matches!(
                error,
                ConfigError::Invalid {
                    field: "pipeline.concurrency",
                    ..
                }
            ));
        }
    }

    #[test]
    fn dry_run_always_logs() {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        let dispatcher = dispatcher(&ScanConfig::default(), true, http);
        assert_eq!(dispatcher.name(), "log");
    }
}
