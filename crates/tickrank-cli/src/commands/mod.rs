mod history;
mod quote;
mod rank;

use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;

use tickrank_core::{
    DataSource, Quote, ReqwestHttpClient, Symbol, SymbolFailure, YahooAdapter,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Quotes plus the symbols that could not be quoted.
#[derive(Debug, Serialize)]
pub struct QuoteReport {
    pub quotes: Vec<Quote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SymbolFailure>,
}

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let source = build_source(cli);

    match &cli.command {
        Command::Rank(args) => rank::run(args, cli, source).await,
        Command::Quote(args) => quote::run(args, cli, source).await,
        Command::History(args) => history::run(args, cli, source).await,
    }
}

fn build_source(cli: &Cli) -> Arc<dyn DataSource> {
    if cli.mock {
        Arc::new(YahooAdapter::default())
    } else {
        let http_client = Arc::new(ReqwestHttpClient::new());
        Arc::new(
            YahooAdapter::with_http_client(http_client).with_timeout_ms(cli.timeout_ms),
        )
    }
}

/// Parse symbols that may arrive space-separated, comma-separated, or both.
pub fn parse_symbol_args(raw: &[String]) -> Result<Vec<Symbol>, CliError> {
    let joined = raw.join(",");
    let symbols = tickrank_core::RefreshConfig::parse_symbols(&joined)?;
    if symbols.is_empty() {
        return Err(CliError::Command(String::from(
            "at least one symbol is required",
        )));
    }
    Ok(symbols)
}
