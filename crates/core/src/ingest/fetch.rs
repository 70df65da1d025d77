use crate::domain::dataset::Dataset;
use crate::ingest::source::{FetchError, StockSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const DEFAULT_MAX_CONCURRENCY: usize = 16;
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Upper bound on in-flight upstream calls.
    pub max_concurrency: usize,

    /// Per-stock deadline; an expired fetch counts as a failure for that
    /// symbol only.
    pub timeout: Duration,

    /// Log a progress line every this many completions. 0 disables.
    pub progress_every: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Fetch every symbol through `source` and merge the successes into a
/// [`Dataset`].
///
/// One task per symbol, at most `max_concurrency` in flight. A failed,
/// timed-out, or panicking fetch is logged and leaves its symbol out of
/// the dataset; it never aborts the build and is never re-attempted.
/// Returns only after every task has settled.
pub async fn build_dataset(
    symbols: &[String],
    source: Arc<dyn StockSource>,
    opts: &FetchOptions,
) -> Dataset {
    let total = symbols.len();
    let max_concurrency = opts.max_concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(max_concurrency));

    tracing::info!(
        source = source.source_name(),
        total,
        max_concurrency,
        timeout_ms = opts.timeout.as_millis() as u64,
        "starting dataset build"
    );

    let mut handles = Vec::with_capacity(total);
    for symbol in symbols {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let symbol = symbol.clone();
        let timeout = opts.timeout;

        let task = symbol.clone();
        handles.push((
            symbol,
            tokio::spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire_owned().await.ok();
                match tokio::time::timeout(timeout, source.fetch_one(&task)).await {
                    Ok(res) => res,
                    Err(_) => Err(FetchError::TimedOut(timeout)),
                }
            }),
        ));
    }

    let mut dataset = Dataset::new();
    let mut failures: usize = 0;

    for (idx, (symbol, handle)) in handles.into_iter().enumerate() {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => {
                // A panicking adapter is confined to its own task.
                failures += 1;
                tracing::warn!(
                    ticker = %symbol,
                    error = %join_err,
                    "fetch task aborted; skipping stock"
                );
                log_progress(opts.progress_every, idx + 1, total, dataset.len(), failures);
                continue;
            }
        };

        match outcome {
            Ok(record) => {
                dataset.insert(record);
            }
            Err(err) => {
                failures += 1;
                tracing::warn!(
                    ticker = %symbol,
                    failure_count = failures,
                    error = %err,
                    "fetch failed; skipping stock"
                );
            }
        }

        log_progress(opts.progress_every, idx + 1, total, dataset.len(), failures);
    }

    tracing::info!(
        source = source.source_name(),
        total,
        items = dataset.len(),
        failures,
        "dataset build complete"
    );

    dataset
}

fn log_progress(progress_every: usize, n: usize, total: usize, items: usize, failures: usize) {
    if progress_every == 0 {
        return;
    }
    if n == 1 || n == total || n % progress_every == 0 {
        tracing::info!(processed = n, total, items, failures, "dataset build progress");
    }
}
