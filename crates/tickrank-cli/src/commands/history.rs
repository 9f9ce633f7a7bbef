use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use tickrank_core::{DataSource, HistoryRequest, Lookback, Symbol};

use crate::cli::{Cli, HistoryArgs};
use crate::error::CliError;
use crate::output;

pub async fn run(
    args: &HistoryArgs,
    cli: &Cli,
    source: Arc<dyn DataSource>,
) -> Result<ExitCode, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let lookback = Lookback::from_str(&args.lookback)?;

    let history = source
        .daily_history(HistoryRequest::new(symbol, lookback))
        .await
        .map_err(|error| CliError::Command(error.to_string()))?;

    output::render_history(&history, cli.format, cli.pretty)?;
    Ok(ExitCode::SUCCESS)
}
