//! QuoteDesk CLI — one-shot views and an interactive session.
//!
//! Commands:
//! - `view` — single render pass: status line, recent rows, optional CSV export
//! - `session` — interactive loop keeping the cache and last-known-good store
//!   alive across renders
//!
//! The API credential is read once at startup from `ALPHAVANTAGE_API_KEY`
//! (a `.env` file works); a missing credential aborts before any fetch.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use quotedesk_core::data::alphavantage::AlphaVantageClient;
use quotedesk_core::data::resample::ResamplePeriod;
use quotedesk_view::config::{api_key_from_env, AppConfig};
use quotedesk_view::export;
use quotedesk_view::notify::{Notifier, StdoutNotifier};
use quotedesk_view::pipeline::{ViewRequest, ViewResult, ViewSession};

#[derive(Parser)]
#[command(name = "quotedesk", about = "QuoteDesk — daily stock quote viewer")]
struct Cli {
    /// Path to a TOML config file. Defaults to ./quotedesk.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one view of a symbol and exit.
    View {
        /// Ticker symbol (e.g. MSFT).
        symbol: String,

        /// Bar period: daily, weekly, or monthly.
        #[arg(long, default_value = "daily")]
        period: ResamplePeriod,

        /// Trailing window of bars (60-250). Defaults to the config value.
        #[arg(long)]
        bars: Option<usize>,

        /// Annotate 20/50-bar moving averages.
        #[arg(long, default_value_t = false)]
        averages: bool,

        /// Write the table as CSV next to the terminal output.
        #[arg(long, default_value_t = false)]
        csv: bool,

        /// Directory for CSV exports. Defaults to the working directory.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Interactive session: enter symbols and directives until :quit.
    Session,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotedesk=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let api_key = api_key_from_env()?;

    let client = AlphaVantageClient::with_timeout(api_key.clone(), config.request_timeout())
        .with_base_url(config.base_url.clone())
        .with_backoff(config.rate_limit_backoff());
    let mut session = ViewSession::new(client, api_key, config.cache_ttl());

    match cli.command {
        Commands::View {
            symbol,
            period,
            bars,
            averages,
            csv,
            output_dir,
        } => {
            let request = ViewRequest {
                symbol,
                period,
                bars: bars.unwrap_or(config.default_bars),
                show_averages: averages,
            };
            let result = session.render(&request)?;
            print_view(&result, &StdoutNotifier);
            if csv {
                let path = write_export(&result, &output_dir)?;
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
        Commands::Session => run_session(&mut session, &config),
    }
}

/// Print one rendered view: heading, status, recent rows.
fn print_view(result: &ViewResult, notifier: &dyn Notifier) {
    if let Some(advisory) = &result.advisory {
        notifier.advisory(advisory);
    }

    println!("\n{} price ({})", result.symbol, result.period);
    println!("Status: {}", result.status.describe());

    let bars = result.table.bars();
    let recent = &bars[bars.len().saturating_sub(10)..];
    let offset = bars.len() - recent.len();

    match &result.averages {
        Some(_) => println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12} {:>10} {:>10}",
            "date", "open", "high", "low", "close", "volume", "sma_20", "sma_50"
        ),
        None => println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12}",
            "date", "open", "high", "low", "close", "volume"
        ),
    }

    for (i, bar) in recent.iter().enumerate() {
        let mut line = format!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12}",
            bar.date,
            cell(bar.open),
            cell(bar.high),
            cell(bar.low),
            cell(bar.close),
            bar.volume
        );
        if let Some(avg) = &result.averages {
            let idx = offset + i;
            line.push_str(&format!(
                " {:>10} {:>10}",
                cell(avg.sma20[idx]),
                cell(avg.sma50[idx])
            ));
        }
        println!("{line}");
    }
    println!("({} bars total)", bars.len());
}

fn cell(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Write the CSV export with the suggested filename into `dir`.
fn write_export(result: &ViewResult, dir: &std::path::Path) -> Result<PathBuf> {
    let filename = export::suggested_filename(
        &result.symbol,
        result.period,
        chrono::Local::now().date_naive(),
    );
    export::save_csv(dir, &filename, &result.table, result.averages.as_ref())
}

const SESSION_HELP: &str = "\
Enter a ticker symbol to render it, or a directive:
  :period daily|weekly|monthly   switch the bar period
  :bars N                        trailing window (60-250)
  :averages on|off               toggle the 20/50 moving averages
  :export [DIR]                  write the last view as CSV
  :clear                         clear the quote cache
  :quit                          leave the session";

/// Interactive loop. The cache and last-known-good store live for the whole
/// session, so repeat views of a symbol inside the TTL window skip the
/// network entirely.
fn run_session(
    session: &mut ViewSession<AlphaVantageClient>,
    config: &AppConfig,
) -> Result<()> {
    let notifier = StdoutNotifier;
    let mut request = ViewRequest {
        symbol: String::new(),
        period: ResamplePeriod::Daily,
        bars: config.default_bars,
        show_averages: true,
    };
    let mut last_result: Option<ViewResult> = None;

    println!("{SESSION_HELP}");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(directive) = input.strip_prefix(':') {
            let mut parts = directive.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("quit"), _) | (Some("q"), _) => break,
                (Some("clear"), _) => session.clear_cache(&notifier),
                (Some("period"), Some(value)) => match value.parse() {
                    Ok(period) => request.period = period,
                    Err(e) => println!("{e}"),
                },
                (Some("bars"), Some(value)) => match value.parse::<usize>() {
                    Ok(bars) => request.bars = bars,
                    Err(_) => println!("bars must be a number"),
                },
                (Some("averages"), Some("on")) => request.show_averages = true,
                (Some("averages"), Some("off")) => request.show_averages = false,
                (Some("export"), dir) => match &last_result {
                    Some(result) => {
                        let dir = PathBuf::from(dir.unwrap_or("."));
                        match write_export(result, &dir) {
                            Ok(path) => println!("Wrote {}", path.display()),
                            Err(e) => println!("Export failed: {e:#}"),
                        }
                    }
                    None => println!("Nothing to export yet — render a symbol first."),
                },
                _ => println!("{SESSION_HELP}"),
            }
            continue;
        }

        request.symbol = input.to_string();
        match session.render(&request) {
            Ok(result) => {
                print_view(&result, &notifier);
                last_result = Some(result);
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    Ok(())
}
