//! ZLEMA CLI: one-shot queries and order commands against the trading backend.
//!
//! Commands:
//! - `status`, `trades`, `market-status`, `news`: account and feed snapshots
//! - `market-data`, `key-levels`, `predictions`, `chart`: chart inputs for one pair
//! - `buy`, `sell`, `close`, `close-all`, `connect`: order routing

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use zlema_core::api::{ApiClient, ApiError, HttpTransport};
use zlema_core::chart::{build_chart, ChartInput};
use zlema_core::config::DashboardConfig;
use zlema_core::domain::params::{MAX_UNITS, MIN_UNITS, UNIT_STEP};
use zlema_core::domain::pips::{display_pair, format_pips, price_decimals};
use zlema_core::domain::{
    AccountMode, Direction, PolynomialParams, Timeframe, TradeRequest, TradingParams,
};

#[derive(Parser, Debug)]
#[command(name = "zlema", version, about = "ZLEMA Trader CLI: query the backend and route orders")]
struct Cli {
    /// Config file (defaults to <config dir>/zlema-trader/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides config and ZLEMA_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print raw JSON payloads instead of tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Selection shared by the chart-input commands.
#[derive(clap::Args, Debug, Clone, Default)]
struct MarketArgs {
    /// Pair, e.g. EUR_USD or EUR/USD
    #[arg(long)]
    pair: Option<String>,

    /// M1, M5, M15, M30, H1, H4 or D1
    #[arg(long)]
    timeframe: Option<Timeframe>,

    /// Number of bars
    #[arg(long)]
    periods: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Account mode, balance and realised profit.
    Status,
    /// Open positions with running profit.
    Trades,
    /// Current and next trading session.
    MarketStatus,
    /// Headlines for a pair.
    News {
        #[arg(long)]
        pair: Option<String>,

        /// Ask the backend for model-scored impact tags
        #[arg(long, default_value_t = false)]
        ai: bool,
    },
    /// Candles and indicator series.
    MarketData(MarketArgs),
    /// Support, resistance and related price levels.
    KeyLevels(MarketArgs),
    /// Polynomial forecast for the selected window.
    Predictions {
        #[command(flatten)]
        market: MarketArgs,

        #[arg(long)]
        lookback: Option<u32>,

        #[arg(long)]
        forecast: Option<u32>,

        #[arg(long)]
        degree: Option<u32>,
    },
    /// Build the chart model and list its layers.
    Chart(MarketArgs),
    /// Market buy.
    Buy(OrderArgs),
    /// Market sell.
    Sell(OrderArgs),
    /// Close one position by id.
    Close { trade_id: String },
    /// Close every open position.
    CloseAll,
    /// Switch the backend between test, practice and live routing.
    Connect { mode: AccountMode },
}

#[derive(clap::Args, Debug)]
struct OrderArgs {
    #[arg(long)]
    pair: Option<String>,

    /// Units; defaults to the configured order size
    #[arg(long)]
    size: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = DashboardConfig::load(cli.config.as_deref(), dirs::config_dir().as_deref())
        .context("load dashboard config")?;
    if let Some(url) = cli.api_url.clone() {
        config.api.base_url = url;
    }
    config.validate().context("invalid dashboard config")?;
    debug!(base_url = %config.api.base_url, "resolved backend");

    let transport = HttpTransport::new(config.api.base_url.clone(), config.api.timeout())
        .context("build HTTP transport")?;
    let client = ApiClient::new(transport);

    run(&cli, &config, &client)
}

fn run(cli: &Cli, config: &DashboardConfig, client: &ApiClient<HttpTransport>) -> Result<()> {
    let defaults = &config.defaults;
    match &cli.command {
        Commands::Status => {
            let status = answer(client.account_status())?;
            if cli.json {
                return print_json(&status);
            }
            println!("Account status at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
            println!("  Mode:          {}", status.account_mode.as_str());
            match status.account_balance {
                Some(balance) => println!("  Balance:       {balance:.2}"),
                None => println!("  Balance:       n/a"),
            }
            println!("  Open trades:   {}", status.open_trades_count);
            println!("  Total trades:  {}", status.total_trades);
            println!("  Total profit:  {}", format_pips(status.total_profit));
            if let Some(rate) = status.win_rate() {
                println!("  Win rate:      {:.1}%", rate * 100.0);
            }
            for (name, value) in &status.trading_stats {
                println!("  {name}: {value}");
            }
        }
        Commands::Trades => {
            let trades = answer(client.trades())?;
            if cli.json {
                return print_json(&trades);
            }
            if trades.open_trades.is_empty() {
                println!("No open trades.");
                return Ok(());
            }
            println!(
                "{:<10} {:<9} {:<5} {:>8} {:>10} {:>14}",
                "ID", "Pair", "Side", "Size", "Entry", "P/L"
            );
            for t in &trades.open_trades {
                println!(
                    "{:<10} {:<9} {:<5} {:>8.0} {:>10.*} {:>14}",
                    format!("#{}", t.trade_id),
                    display_pair(&t.pair),
                    t.direction.as_str(),
                    t.size,
                    price_decimals(&t.pair),
                    t.entry_price,
                    format_pips(t.current_pl),
                );
            }
            println!("Total open P/L: {}", format_pips(trades.open_pl()));
        }
        Commands::MarketStatus => {
            let status = answer(client.market_status())?;
            if cli.json {
                return print_json(&status);
            }
            println!(
                "{} session, {} in {}",
                status.current_session,
                status.next_session,
                status.countdown(Duration::ZERO)
            );
        }
        Commands::News { pair, ai } => {
            let pair = pair
                .as_deref()
                .map(normalize_pair)
                .unwrap_or_else(|| defaults.params.pair.clone());
            let feed = answer(client.news(&pair, *ai))?;
            if cli.json {
                return print_json(&feed);
            }
            if feed.news_items.is_empty() {
                println!("No headlines for {}.", display_pair(&pair));
            }
            for item in &feed.news_items {
                match &item.analysis {
                    Some(a) => println!("[{} {}] {}", a.impact, a.confidence, item.title),
                    None => println!("{}", item.title),
                }
                println!("    {} | {}", item.source, item.published);
            }
        }
        Commands::MarketData(args) => {
            let params = resolve_params(&defaults.params, args);
            let market = answer(client.market_data(&params))?;
            if cli.json {
                return print_json(&market);
            }
            println!(
                "{} {} x{}: {} bars, {} smoothed sets, {} efficiency series",
                display_pair(&market.pair),
                market.timeframe,
                market.periods,
                market.bar_count(),
                market.all_candles.len().saturating_sub(1),
                market.eff_data.len(),
            );
            if let Some(close) = market.current_price() {
                println!("Last close: {close:+.1} pips from window mean");
            }
        }
        Commands::KeyLevels(args) => {
            let params = resolve_params(&defaults.params, args);
            let levels = answer(client.key_levels(&params))?;
            if cli.json {
                return print_json(&levels);
            }
            for level in &levels.key_levels.levels {
                println!(
                    "{:<12} {:>10.4}  confidence {:.2}",
                    level.kind.label(),
                    level.price,
                    level.confidence
                );
            }
        }
        Commands::Predictions {
            market,
            lookback,
            forecast,
            degree,
        } => {
            let params = resolve_params(&defaults.params, market);
            let poly = PolynomialParams {
                lookback: lookback.unwrap_or(defaults.polynomial.lookback),
                forecast_periods: forecast.unwrap_or(defaults.polynomial.forecast_periods),
                degree: degree.unwrap_or(defaults.polynomial.degree),
            }
            .clamped();
            let predictions = answer(client.polynomial_predictions(&params, &poly))?;
            if cli.json {
                return print_json(&predictions);
            }
            println!("Fitted:   {}", join(&predictions.fitted));
            println!("Forecast: {}", join(&predictions.predictions));
        }
        Commands::Chart(args) => {
            let params = resolve_params(&defaults.params, args);
            let market = answer(client.market_data(&params))?;
            let levels = client.key_levels(&params)?;
            let predictions = if defaults.toggles.polynomial {
                client.polynomial_predictions(&params, &defaults.polynomial)?
            } else {
                None
            };
            let chart = build_chart(&ChartInput {
                market: &market,
                key_levels: levels.as_ref().map(|l| &l.key_levels),
                predictions: predictions.as_ref(),
                overlays: &defaults.overlays,
                toggles: &defaults.toggles,
                params: &params,
            });
            println!("{}", chart.title);
            for category in chart.categories() {
                let traces: Vec<_> = chart.of_category(category).collect();
                let points: usize = traces.iter().map(|t| t.points().len()).sum();
                println!("  {category:?}: {} traces, {points} points", traces.len());
            }
        }
        Commands::Buy(order) => place(cli, client, &defaults.params, order, Direction::Buy)?,
        Commands::Sell(order) => place(cli, client, &defaults.params, order, Direction::Sell)?,
        Commands::Close { trade_id } => {
            let closed = answer(client.close_trade(trade_id))?;
            if cli.json {
                return print_json(&closed);
            }
            println!("Trade #{trade_id} {}: {}", closed.status, format_pips(closed.profit));
        }
        Commands::CloseAll => {
            let closed = answer(client.close_all_trades())?;
            if cli.json {
                return print_json(&closed);
            }
            println!(
                "Closed {} trades: {}",
                closed.closed_trades,
                format_pips(closed.total_profit)
            );
        }
        Commands::Connect { mode } => {
            let connected = answer(client.connect(*mode))?;
            if cli.json {
                return print_json(&connected);
            }
            println!("{} ({})", connected.status, connected.mode);
        }
    }
    Ok(())
}

fn place(
    cli: &Cli,
    client: &ApiClient<HttpTransport>,
    base: &TradingParams,
    order: &OrderArgs,
    direction: Direction,
) -> Result<()> {
    let mut params = base.clone();
    if let Some(size) = order.size {
        params.set_units(size);
        if params.units != size {
            bail!("size must be a multiple of {UNIT_STEP} between {MIN_UNITS} and {MAX_UNITS}, got {size}");
        }
    }
    let pair = order
        .pair
        .as_deref()
        .map(normalize_pair)
        .unwrap_or(params.pair);
    let fill = answer(client.place_trade(&TradeRequest {
        pair: pair.clone(),
        size: params.units,
        direction,
    }))?;
    if cli.json {
        return print_json(&fill);
    }
    println!(
        "{direction} {} {} filled at {:.*} (#{}, {})",
        params.units,
        display_pair(&pair),
        price_decimals(&pair),
        fill.price,
        fill.trade_id,
        fill.mode
    );
    Ok(())
}

/// A one-shot command has no competing request, so a superseded reply is an error.
fn answer<T>(result: Result<Option<T>, ApiError>) -> Result<T> {
    match result? {
        Some(value) => Ok(value),
        None => bail!("request was cancelled before the backend answered"),
    }
}

fn resolve_params(base: &TradingParams, args: &MarketArgs) -> TradingParams {
    let mut params = base.clone();
    if let Some(pair) = &args.pair {
        params.pair = normalize_pair(pair);
    }
    if let Some(timeframe) = args.timeframe {
        params.timeframe = timeframe;
    }
    if let Some(periods) = args.periods {
        params.periods = periods.max(1);
    }
    params
}

/// `eur/usd` and `EUR_USD` both name the backend's `EUR_USD`.
fn normalize_pair(pair: &str) -> String {
    pair.trim().replace('/', "_").to_ascii_uppercase()
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_with_size() {
        let cli = Cli::try_parse_from(["zlema", "buy", "--pair", "eur/usd", "--size", "20000"])
            .unwrap();
        match cli.command {
            Commands::Buy(order) => {
                assert_eq!(order.pair.as_deref(), Some("eur/usd"));
                assert_eq!(order.size, Some(20_000));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["zlema", "trades", "--json", "--api-url", "http://x:1"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
    }

    #[test]
    fn connect_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["zlema", "connect", "paper"]).is_err());
        let cli = Cli::try_parse_from(["zlema", "connect", "LIVE"]).unwrap();
        assert!(matches!(cli.command, Commands::Connect { mode: AccountMode::Live }));
    }

    #[test]
    fn timeframe_is_validated() {
        assert!(Cli::try_parse_from(["zlema", "market-data", "--timeframe", "H2"]).is_err());
        let cli = Cli::try_parse_from(["zlema", "chart", "--timeframe", "H4"]).unwrap();
        match cli.command {
            Commands::Chart(args) => assert_eq!(args.timeframe, Some(Timeframe::H4)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn market_args_override_defaults() {
        let base = TradingParams::default();
        let args = MarketArgs {
            pair: Some("usd/jpy".into()),
            timeframe: None,
            periods: Some(0),
        };
        let params = resolve_params(&base, &args);
        assert_eq!(params.pair, "USD_JPY");
        assert_eq!(params.timeframe, base.timeframe);
        assert_eq!(params.periods, 1);
    }

    #[test]
    fn superseded_reply_is_an_error() {
        assert!(answer::<u32>(Ok(None)).is_err());
        assert_eq!(answer(Ok(Some(3))).unwrap(), 3);
    }
}
