use std::process::ExitCode;

use serde::Serialize;
use tickerdash_core::{Period, ProviderId};

use crate::cli::Cli;
use crate::commands::{CommandData, CommandResult};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize)]
pub struct PeriodInfo {
    pub token: Period,
    pub label: &'static str,
    pub trading_days: usize,
}

pub fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let periods = Period::ALL
        .iter()
        .map(|period| PeriodInfo {
            token: *period,
            label: period.label(),
            trading_days: period.trading_days(),
        })
        .collect();

    let source = if cli.offline {
        ProviderId::Synthetic
    } else {
        ProviderId::Yahoo
    };
    let envelope =
        CommandResult::ok(CommandData::Periods(periods), vec![source]).into_envelope()?;
    output::render_stdout(&envelope, cli.format, cli.pretty)?;
    Ok(ExitCode::SUCCESS)
}
