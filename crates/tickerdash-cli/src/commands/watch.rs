use std::process::ExitCode;

use tickerdash_core::{RefreshLoop, StopHandle};
use tracing::{info, warn};

use crate::cli::{Cli, WatchArgs};
use crate::commands::{build_fetcher, dashboard_config, CommandResult};
use crate::error::CliError;
use crate::output;

/// Renders every cycle as it completes. Fetch failures are shown and the
/// loop keeps going; only output errors or a stop end it.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<ExitCode, CliError> {
    let (refresh, stop) = refresh_loop(args, cli.offline)?;

    let ctrl_c = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl-c received, stopping after the current cycle");
                stop.stop();
            }
            Err(error) => warn!(%error, "cannot listen for ctrl-c"),
        }
    });

    let result = refresh
        .run(|_, dashboard| {
            let envelope = CommandResult::from_dashboard(dashboard.clone()).into_envelope()?;
            output::render_stdout(&envelope, cli.format, cli.pretty)
        })
        .await;
    ctrl_c.abort();

    let summary = result?;
    info!(cycles = summary.cycles, reason = ?summary.reason, "watch finished");
    Ok(ExitCode::SUCCESS)
}

fn refresh_loop(args: &WatchArgs, offline: bool) -> Result<(RefreshLoop, StopHandle), CliError> {
    let config = dashboard_config(&args.dashboard)?;
    let fetcher = build_fetcher(offline, &config);
    let (refresh, stop) = RefreshLoop::new(config, fetcher);
    Ok((refresh.with_max_cycles(args.max_cycles), stop))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use clap::Parser;

    use super::*;
    use crate::cli::Command;

    fn args(extra: &[&str]) -> WatchArgs {
        let argv = ["tickerdash", "--offline", "watch"]
            .into_iter()
            .chain(extra.iter().copied());
        match Cli::try_parse_from(argv).expect("parse").command {
            Command::Watch(args) => args,
            _ => panic!("expected watch"),
        }
    }

    #[tokio::test]
    async fn empty_symbol_keeps_the_loop_running() {
        let (refresh, _stop) =
            refresh_loop(&args(&["", "--refresh", "5", "--max-cycles", "2"]), true).expect("valid");
        let started = Instant::now();
        let mut codes = Vec::new();

        let summary = refresh
            .run(|cycle, dashboard| {
                let envelope = CommandResult::from_dashboard(dashboard.clone()).into_envelope()?;
                codes.push((cycle, envelope.errors[0].code.clone()));
                Ok::<_, CliError>(())
            })
            .await
            .expect("sink succeeds");

        assert_eq!(summary.cycles, 2);
        assert_eq!(
            codes,
            [(1, "data.unavailable".to_owned()), (2, "data.unavailable".to_owned())]
        );
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn bad_refresh_is_rejected_before_the_first_cycle() {
        let err = refresh_loop(&args(&["AAPL", "--refresh", "61"]), true)
            .err()
            .expect("must fail");
        assert!(matches!(err, CliError::Validation(_)));
    }
}
