use crate::domain::stock::StockRecord;
use std::time::Duration;
use thiserror::Error;

/// Why a single stock could not be fetched. Always scoped to one symbol;
/// the orchestrator recovers by leaving that symbol out of the dataset.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown symbol '{symbol}'")]
    UnknownSymbol { symbol: String },

    #[error("fetch timed out after {0:?}")]
    TimedOut(Duration),
}

/// One upstream data source. Implementations hold no per-call mutable
/// state, so the orchestrator may invoke `fetch_one` concurrently for
/// different symbols.
#[async_trait::async_trait]
pub trait StockSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Each source names its own dataset snapshot so caches for different
    /// sources never collide.
    fn cache_file_name(&self) -> &'static str;

    async fn fetch_one(&self, symbol: &str) -> Result<StockRecord, FetchError>;
}
