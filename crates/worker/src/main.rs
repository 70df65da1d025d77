use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stocksift_core::config::Settings;
use stocksift_core::domain::dataset::Dataset;
use stocksift_core::ingest::fetch::{self, FetchOptions};
use stocksift_core::ingest::iex::IexSource;
use stocksift_core::ingest::six::SixSwissSource;
use stocksift_core::ingest::source::StockSource;
use stocksift_core::screener::{self, SelectionParams};
use stocksift_core::storage::snapshot;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;
mod tickers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    Iex,
    Six,
}

#[derive(Debug, Parser)]
#[command(name = "stocksift_worker")]
struct Args {
    /// Data source backing the screen.
    #[arg(long, value_enum, default_value_t = SourceKind::Iex)]
    source: SourceKind,

    /// Re-download stock data even when a cached snapshot exists.
    #[arg(long)]
    refresh: bool,

    /// Directory holding dataset snapshots.
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Ticker file (one symbol per line, '#' comments) overriding the
    /// downloaded index composition.
    #[arg(long)]
    tickers_file: Option<PathBuf>,

    /// Swiss listings CSV (name;ticker;isin;sector). Required with
    /// --source six.
    #[arg(long)]
    listings_file: Option<PathBuf>,

    /// Stocks ranked by dividend yield that enter the screen.
    #[arg(long, default_value_t = screener::DEFAULT_TOP_BY_YIELD)]
    top_by_yield: usize,

    /// Sector quota applied while walking the ROA ranking.
    #[arg(long, default_value_t = screener::DEFAULT_MAX_PER_SECTOR)]
    max_per_sector: usize,

    /// Size of the final selection.
    #[arg(long, default_value_t = screener::DEFAULT_MAX_PICKS)]
    max_picks: usize,

    /// Parallel upstream fetches.
    #[arg(long, default_value_t = 16)]
    concurrency: usize,

    /// Per-stock fetch deadline in seconds.
    #[arg(long, default_value_t = 20)]
    fetch_timeout_secs: u64,

    /// Truncate the ticker list (smoke runs).
    #[arg(long)]
    max_tickers: Option<usize>,

    /// Write the selection as CSV here, plus a *-universe.csv next to it
    /// with every fetched stock.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run the screen without writing the snapshot or report files.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args, settings).await {
        sentry_anyhow::capture_anyhow(&err);
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args, settings: Settings) -> anyhow::Result<()> {
    // For the Swiss source the listings file is also the ticker universe,
    // so keep the symbols before the adapter is boxed away.
    let (source, listed): (Arc<dyn StockSource>, Option<Vec<String>>) = match args.source {
        SourceKind::Iex => (Arc::new(IexSource::from_settings(&settings)?), None),
        SourceKind::Six => {
            let listings_file = args
                .listings_file
                .as_deref()
                .context("--listings-file is required with --source six")?;
            let six = SixSwissSource::from_listings_file(&settings, listings_file)?;
            let symbols = six.symbols();
            (Arc::new(six), Some(symbols))
        }
    };

    let cache_path = args.cache_dir.join(source.cache_file_name());
    let dataset = obtain_dataset(&args, &settings, Arc::clone(&source), &cache_path, listed).await?;
    anyhow::ensure!(!dataset.is_empty(), "dataset is empty; nothing to screen");

    let params = SelectionParams {
        top_by_yield: args.top_by_yield,
        max_per_sector: args.max_per_sector,
        max_picks: args.max_picks,
    };
    tracing::info!(
        stocks = dataset.len(),
        top_by_yield = params.top_by_yield,
        max_per_sector = params.max_per_sector,
        max_picks = params.max_picks,
        "screening dataset"
    );

    let selection = screener::pick_stocks(&dataset, &params);
    tracing::info!(picks = selection.len(), "selection complete");

    report::print_selection(&selection);

    if let Some(output) = &args.output {
        if args.dry_run {
            tracing::info!(dry_run = true, "skipping report files");
        } else {
            report::write_csv_reports(output, &selection, &dataset)?;
        }
    }

    Ok(())
}

async fn obtain_dataset(
    args: &Args,
    settings: &Settings,
    source: Arc<dyn StockSource>,
    cache_path: &std::path::Path,
    listed: Option<Vec<String>>,
) -> anyhow::Result<Dataset> {
    if !args.refresh {
        match snapshot::load_file(cache_path) {
            Ok(file) => {
                let age = chrono::Utc::now() - file.generated_at;
                tracing::info!(
                    path = %cache_path.display(),
                    stocks = file.stocks.len(),
                    generated_at = %file.generated_at,
                    age_hours = age.num_hours(),
                    "using cached dataset; pass --refresh to re-download"
                );
                return Ok(file.into_dataset());
            }
            Err(snapshot::SnapshotError::NotFound { .. }) => {
                tracing::info!(path = %cache_path.display(), "no cached dataset; downloading");
            }
            Err(err) => {
                return Err(err)
                    .context("cached dataset is unreadable; pass --refresh to rebuild it");
            }
        }
    }

    let symbols = tickers::resolve(
        args.tickers_file.as_deref(),
        args.max_tickers,
        settings,
        listed,
    )
    .await?;
    anyhow::ensure!(!symbols.is_empty(), "ticker list is empty");

    let opts = FetchOptions {
        max_concurrency: args.concurrency,
        timeout: Duration::from_secs(args.fetch_timeout_secs),
        ..FetchOptions::default()
    };
    let dataset = fetch::build_dataset(&symbols, source, &opts).await;

    if args.dry_run {
        tracing::info!(dry_run = true, stocks = dataset.len(), "skipping snapshot write");
    } else {
        snapshot::save(&dataset, cache_path)
            .with_context(|| format!("failed to write snapshot {}", cache_path.display()))?;
        tracing::info!(path = %cache_path.display(), stocks = dataset.len(), "snapshot written");
    }

    Ok(dataset)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
