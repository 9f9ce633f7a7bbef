use std::process::ExitCode;
use std::sync::Arc;

use tickrank_core::{DataSource, Engine, EngineError, RefreshConfig, Symbol};

use crate::cli::{Cli, RankArgs};
use crate::error::CliError;
use crate::output;

use super::parse_symbol_args;

pub async fn run(
    args: &RankArgs,
    cli: &Cli,
    source: Arc<dyn DataSource>,
) -> Result<ExitCode, CliError> {
    let symbols = parse_symbol_args(&args.symbols)?;
    let benchmark = Symbol::parse(&args.benchmark)?;

    let config = RefreshConfig::new(symbols, args.capital)?
        .with_selection_count(args.top)?
        .with_concurrency(args.concurrency)?
        .with_timeout_ms(cli.timeout_ms)
        .with_benchmark(benchmark)
        .with_backtest(args.backtest);

    let engine = Engine::new(source);

    match args.watch_secs {
        None => run_once(&engine, &config, cli).await,
        Some(interval_secs) => {
            // The live-dashboard loop: each pass is an independent refresh,
            // and one bad cycle never stops the watch.
            let interval = std::time::Duration::from_secs(interval_secs.max(1));
            loop {
                if let Err(error) = run_once(&engine, &config, cli).await {
                    eprintln!("error: {error}");
                }
                tokio::time::sleep(interval).await;
            }
        }
    }
}

async fn run_once(
    engine: &Engine,
    config: &RefreshConfig,
    cli: &Cli,
) -> Result<ExitCode, CliError> {
    let snapshot = match engine.refresh(config).await {
        Ok(snapshot) => snapshot,
        Err(EngineError::NoData { failures }) => {
            eprintln!("no data: every symbol was excluded this refresh");
            for failure in &failures {
                eprintln!("  - {}: {}", failure.symbol, failure.reason);
            }
            return Ok(ExitCode::from(3));
        }
        Err(error) => return Err(error.into()),
    };
    output::render_snapshot(&snapshot, cli.format, cli.pretty)?;

    if snapshot.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(3))
    }
}
