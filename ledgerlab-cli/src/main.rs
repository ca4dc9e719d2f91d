//! LedgerLab CLI — fetch and run commands.
//!
//! Commands:
//! - `run` — execute a backtest from flags or a TOML config file
//! - `fetch` — fetch a price series and print it, without simulating
//!
//! Strategy selection on the command line uses compact specs:
//! `close_market`, `sma:9`, `ma_crossover:9:21[:exponential]`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use ledgerlab_core::data::{PriceProvider, SyntheticProvider, YahooProvider};
use ledgerlab_core::domain::Timeframe;
use ledgerlab_core::indicators::MaKind;
use ledgerlab_core::strategy::{CloseMarket, MaCrossover, SmaSignal, Strategy};
use ledgerlab_core::{ConfigError, TransactionLedger};
use ledgerlab_runner::{
    backtest, export_outcome, BacktestConfig, BacktestOutcome, BacktestParams, PerformanceSummary,
};

#[derive(Parser)]
#[command(name = "ledgerlab", about = "LedgerLab CLI — signal-to-ledger backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest and print its performance summary.
    Run {
        /// Path to a TOML config file; flags below are ignored when set.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Ticker symbol, or a .txt file whose first line is one.
        #[arg(long)]
        symbol: Option<String>,

        /// Strategy spec: close_market, sma:WINDOW, ma_crossover:FAST:SLOW[:KIND].
        #[arg(long, default_value = "sma:9")]
        strategy: String,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<String>,

        /// Bar granularity: 1m..90m, 1h, 1d, 5d, 1wk, 1mo, 3mo.
        #[arg(long, default_value = "1d")]
        timeframe: String,

        /// Starting capital.
        #[arg(long, default_value_t = 10_000.0)]
        capital: f64,

        /// Flat fee per transaction.
        #[arg(long, default_value_t = 0.0)]
        fee: f64,

        /// Fraction of capital per entry, in (0, 1]. Overrides the strategy's own sizing.
        #[arg(long)]
        sizing: Option<f64>,

        /// Include the buy-and-hold baseline in the summary.
        #[arg(long, default_value_t = false)]
        buy_and_hold: bool,

        /// Waive the flat fee on a forced end-of-series liquidation.
        #[arg(long, default_value_t = false)]
        no_fee_on_forced_close: bool,

        /// Narrate each transaction.
        #[arg(long, default_value_t = false)]
        verbose: bool,

        /// Use deterministic synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Export transactions.csv, closed_positions.csv, performance.csv here.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Fetch a price series and print one line per bar.
    Fetch {
        /// Ticker symbol.
        #[arg(long)]
        symbol: String,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: String,

        /// Bar granularity: 1m..90m, 1h, 1d, 5d, 1wk, 1mo, 3mo.
        #[arg(long, default_value = "1d")]
        timeframe: String,

        /// Use deterministic synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            symbol,
            strategy,
            start,
            end,
            timeframe,
            capital,
            fee,
            sizing,
            buy_and_hold,
            no_fee_on_forced_close,
            verbose,
            synthetic,
            export,
        } => {
            let (strategy, params) = match config {
                Some(path) => {
                    let config = BacktestConfig::from_file(&path)
                        .with_context(|| format!("loading {}", path.display()))?;
                    let mut params = config.to_params();
                    params.verbose = verbose;
                    if no_fee_on_forced_close {
                        params.fee_on_forced_close = false;
                    }
                    (config.build_strategy()?, params)
                }
                None => {
                    let Some(symbol) = symbol else {
                        bail!("either --config or --symbol is required");
                    };
                    let (Some(start), Some(end)) = (start, end) else {
                        bail!("--start and --end are required without --config");
                    };
                    let params = BacktestParams {
                        symbol_or_file: symbol,
                        start,
                        end,
                        timeframe: timeframe.parse::<Timeframe>()?,
                        capital,
                        fee,
                        position_sizing: sizing,
                        include_buy_and_hold: buy_and_hold,
                        fee_on_forced_close: !no_fee_on_forced_close,
                        verbose,
                    };
                    (parse_strategy(&strategy)?, params)
                }
            };

            let provider = make_provider(synthetic);
            let ledger = TransactionLedger::new();
            let outcome = backtest(&strategy, provider.as_ref(), &ledger, &params)?;

            print_summary(&outcome);

            if let Some(dir) = export {
                let paths = export_outcome(&dir, &outcome)?;
                println!("Exported artifacts to {}", paths.dir.display());
            }
            Ok(())
        }
        Commands::Fetch {
            symbol,
            start,
            end,
            timeframe,
            synthetic,
        } => {
            let timeframe = timeframe.parse::<Timeframe>()?;
            let start = start.parse().context("--start is not a valid ISO date")?;
            let end = end.parse().context("--end is not a valid ISO date")?;
            let provider = make_provider(synthetic);
            let bars = provider.fetch(&symbol.to_uppercase(), timeframe, start, end)?;

            println!("date,open,high,low,close");
            for bar in &bars {
                println!(
                    "{},{:.2},{:.2},{:.2},{:.2}",
                    bar.date.format("%Y-%m-%dT%H:%M:%SZ"),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close
                );
            }
            Ok(())
        }
    }
}

fn make_provider(synthetic: bool) -> Box<dyn PriceProvider> {
    if synthetic {
        Box::new(SyntheticProvider::default())
    } else {
        Box::new(YahooProvider::new())
    }
}

fn malformed(reason: impl Into<String>) -> ConfigError {
    ConfigError::MalformedStrategy {
        reason: reason.into(),
    }
}

/// Parse a compact strategy spec:
/// `close_market`, `sma:9`, `ma_crossover:9:21[:simple|weighted|exponential]`.
fn parse_strategy(spec: &str) -> Result<Strategy, ConfigError> {
    let mut parts = spec.split(':');
    let kind = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match kind {
        "close_market" => {
            if !args.is_empty() {
                return Err(malformed(format!("close_market takes no parameters (got '{spec}')")));
            }
            Ok(Strategy::Stepwise(Box::new(CloseMarket::default())))
        }
        "sma" => {
            let [window] = args.as_slice() else {
                return Err(malformed(format!("expected sma:WINDOW (got '{spec}')")));
            };
            let window: usize = window
                .parse()
                .map_err(|_| malformed(format!("bad window in '{spec}'")))?;
            if window == 0 {
                return Err(malformed("sma window must be at least 1"));
            }
            Ok(Strategy::Stepwise(Box::new(SmaSignal::new(window, 1.0))))
        }
        "ma_crossover" => {
            let (fast, slow, ma) = match args.as_slice() {
                [fast, slow] => (*fast, *slow, MaKind::Simple),
                [fast, slow, kind] => (*fast, *slow, parse_ma_kind(kind)?),
                _ => {
                    return Err(malformed(format!(
                        "expected ma_crossover:FAST:SLOW[:KIND] (got '{spec}')"
                    )))
                }
            };
            let parse_window = |name: &str, raw: &str| {
                raw.parse::<usize>()
                    .map_err(|_| malformed(format!("bad {name} window in '{spec}'")))
            };
            let fast = parse_window("fast", fast)?;
            let slow = parse_window("slow", slow)?;
            if fast == 0 || fast >= slow {
                return Err(malformed(format!(
                    "need 0 < fast < slow, got fast={fast} slow={slow}"
                )));
            }
            Ok(Strategy::Vector(Box::new(MaCrossover::new(fast, slow, ma))))
        }
        other => Err(malformed(format!(
            "unknown strategy '{other}' (expected close_market, sma, ma_crossover)"
        ))),
    }
}

fn parse_ma_kind(s: &str) -> Result<MaKind, ConfigError> {
    match s {
        "simple" => Ok(MaKind::Simple),
        "weighted" => Ok(MaKind::Weighted),
        "exponential" => Ok(MaKind::Exponential),
        other => Err(malformed(format!("unknown moving average kind '{other}'"))),
    }
}

fn print_summary(outcome: &BacktestOutcome) {
    println!();
    println!("=== Backtest Result ===");
    println!("Run:            {}", outcome.run);
    println!("Bars:           {}", outcome.bars.len());
    println!("Transactions:   {}", outcome.transactions.len());

    match &outcome.summary {
        PerformanceSummary::NoTrades { .. } => {
            println!();
            println!("No trades were made.");
        }
        PerformanceSummary::Trades(r) => {
            println!("Trades:         {}", r.trade_count);
            println!();
            println!("--- Performance ---");
            println!("Net P/L:        {:.2}", r.net_pnl);
            println!("Net P/L %:      {:.2}%", r.net_pnl_pct);
            println!("Win Rate:       {:.1}%", r.win_rate * 100.0);
            if let Some(w) = r.largest_win {
                println!("Largest Win:    {w:.2}");
            }
            if let Some(l) = r.largest_loss {
                println!("Largest Loss:   {l:.2}");
            }
            println!("Avg Trade:      {:.2}", r.avg_trade);
            if let Some(w) = r.avg_win {
                println!("Avg Win:        {w:.2}");
            }
            if let Some(l) = r.avg_loss {
                println!("Avg Loss:       {l:.2}");
            }
            println!("Avg Hold:       {:.1} bars", r.avg_holding_bars);
            println!(
                "Hold Range:     {} to {} bars",
                r.shortest_holding_bars, r.longest_holding_bars
            );
            if let Some(bh) = r.buy_and_hold {
                println!();
                println!("--- Buy & Hold ---");
                println!("P/L:            {:.2}", bh.pnl);
                println!("P/L %:          {:.2}%", bh.pnl_pct);
            }
        }
    }
    println!();
}
