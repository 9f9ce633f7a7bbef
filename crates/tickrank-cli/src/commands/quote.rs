use std::process::ExitCode;
use std::sync::Arc;

use tickrank_core::{
    DataSource, FailureReason, HistoryRequest, Lookback, Quote, SymbolFailure,
};

use crate::cli::{Cli, QuoteArgs};
use crate::error::CliError;
use crate::output;

use super::{parse_symbol_args, QuoteReport};

pub async fn run(
    args: &QuoteArgs,
    cli: &Cli,
    source: Arc<dyn DataSource>,
) -> Result<ExitCode, CliError> {
    let symbols = parse_symbol_args(&args.symbols)?;

    let mut quotes = Vec::new();
    let mut failures = Vec::new();
    for symbol in symbols {
        let request = HistoryRequest::new(symbol.clone(), Lookback::OneMonth);
        match source.daily_history(request).await {
            Ok(history) => match Quote::from_history(&history) {
                Some(quote) => quotes.push(quote),
                None => failures.push(SymbolFailure {
                    symbol,
                    reason: FailureReason::MetricUndefined {
                        metric: String::from("last_close"),
                    },
                }),
            },
            Err(error) => failures.push(SymbolFailure {
                symbol,
                reason: FailureReason::Source {
                    code: error.code().to_owned(),
                    message: error.message().to_owned(),
                },
            }),
        }
    }

    let report = QuoteReport { quotes, failures };
    output::render_quotes(&report, cli.format, cli.pretty)?;

    if report.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(3))
    }
}
