use std::process::ExitCode;

use tickerdash_core::{Dashboard, Envelope};

use crate::cli::{Cli, DashboardArgs};
use crate::commands::{build_fetcher, dashboard_config, CommandData, CommandResult};
use crate::error::{CliError, DATA_UNAVAILABLE_EXIT};
use crate::output;

pub async fn run(args: &DashboardArgs, cli: &Cli) -> Result<ExitCode, CliError> {
    let envelope = snapshot(args, cli.offline).await?;
    output::render_stdout(&envelope, cli.format, cli.pretty)?;
    Ok(ExitCode::from(exit_status(&envelope)))
}

async fn snapshot(args: &DashboardArgs, offline: bool) -> Result<Envelope<CommandData>, CliError> {
    let config = dashboard_config(args)?;
    let fetcher = build_fetcher(offline, &config);

    let dashboard = Dashboard::build(&config, &fetcher).await;
    CommandResult::from_dashboard(dashboard).into_envelope()
}

fn exit_status(envelope: &Envelope<CommandData>) -> u8 {
    if envelope.is_success() {
        0
    } else {
        DATA_UNAVAILABLE_EXIT
    }
}
