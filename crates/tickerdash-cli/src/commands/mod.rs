mod periods;
mod snapshot;
mod watch;

use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;
use tickerdash_core::{
    Dashboard, DashboardConfig, DataFetcher, Envelope, EnvelopeError, EnvelopeMeta, Period,
    PriceCache, ProviderId, YahooAdapter,
};

use crate::cli::{Cli, Command, DashboardArgs};
use crate::error::CliError;

pub use periods::PeriodInfo;

/// Payload of an envelope. Serializes as the inner value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandData {
    Dashboard(Box<Dashboard>),
    Periods(Vec<PeriodInfo>),
}

pub struct CommandResult {
    pub data: CommandData,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: CommandData, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            cache_hit: false,
            source_chain,
        }
    }

    /// A fetch failure becomes an envelope error; the dashboard still goes
    /// out as data so consumers see which symbol and period failed.
    pub fn from_dashboard(dashboard: Dashboard) -> Self {
        let source = dashboard.fetch.source;
        let errors = dashboard
            .error
            .iter()
            .map(|error| EnvelopeError::data_unavailable(error, source))
            .collect();

        Self {
            warnings: dashboard.warnings.clone(),
            errors,
            latency_ms: dashboard.fetch.latency_ms,
            cache_hit: dashboard.fetch.cache_hit,
            source_chain: vec![source],
            data: CommandData::Dashboard(Box::new(dashboard)),
        }
    }

    pub fn into_envelope(self) -> Result<Envelope<CommandData>, CliError> {
        let mut meta = EnvelopeMeta::new(self.source_chain, self.latency_ms, self.cache_hit)?;
        for warning in self.warnings {
            meta.push_warning(warning);
        }

        Envelope::with_errors(meta, self.data, self.errors).map_err(CliError::from)
    }
}

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    match &cli.command {
        Command::Snapshot(args) => snapshot::run(args, cli).await,
        Command::Watch(args) => watch::run(args, cli).await,
        Command::Periods => periods::run(cli),
    }
}

/// The symbol is not checked here; a malformed one fails its cycle as
/// data unavailable.
pub(crate) fn dashboard_config(args: &DashboardArgs) -> Result<DashboardConfig, CliError> {
    let period: Period = args.period.parse()?;

    let config = DashboardConfig::new(args.symbol.as_str(), period)
        .with_sma_window(args.sma_window)?
        .with_ema_span(args.ema_window)?
        .with_forecast_days(args.forecast_days)?
        .with_alert_price(args.alert_price)?
        .with_refresh_secs(args.refresh)?;
    Ok(config)
}

/// Cache lifetime follows the refresh interval.
pub(crate) fn build_fetcher(offline: bool, config: &DashboardConfig) -> Arc<DataFetcher> {
    let adapter = if offline {
        YahooAdapter::default()
    } else {
        YahooAdapter::live()
    };

    Arc::new(DataFetcher::new(
        Arc::new(adapter),
        PriceCache::new(config.refresh_interval()),
    ))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> DashboardArgs {
        let argv = ["tickerdash", "snapshot"].into_iter().chain(extra.iter().copied());
        match Cli::try_parse_from(argv).expect("parse").command {
            Command::Snapshot(args) => args,
            _ => panic!("expected snapshot"),
        }
    }

    #[test]
    fn config_from_arguments() {
        let config = dashboard_config(&args(&["tsla", "--period", "6MO", "--alert-price", "250"]))
            .expect("valid");

        assert_eq!(config.symbol_input(), "TSLA");
        assert_eq!(config.period(), Period::SixMonths);
        assert_eq!(config.alert_threshold(), Some(250.0));
    }

    #[test]
    fn out_of_range_window_is_a_validation_error() {
        let err = dashboard_config(&args(&["--sma-window", "51"])).expect_err("must fail");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_symbol_is_not_a_validation_error() {
        let config = dashboard_config(&args(&[""])).expect("accepted");
        assert_eq!(config.symbol_input(), "");
        assert!(config.symbol().is_err());
    }

    #[tokio::test]
    async fn cache_ttl_follows_refresh_interval() {
        let config = dashboard_config(&args(&["--refresh", "30"])).expect("valid");
        let fetcher = build_fetcher(true, &config);

        assert_eq!(fetcher.cache().ttl().await, config.refresh_interval());
        assert_eq!(config.refresh_interval().as_secs(), 30);
    }

    #[test]
    fn unknown_period_is_a_validation_error() {
        let err = dashboard_config(&args(&["--period", "5y"])).expect_err("must fail");
        assert!(matches!(err, CliError::Validation(_)));
    }
}
