use anyhow::{Context, Result};
use std::path::Path;
use stocksift_core::config::Settings;
use stocksift_core::ingest::composition;

/// Decide which tickers to fetch: an explicit ticker file wins, then the
/// listings-derived universe (Swiss source), then the downloaded index
/// composition.
pub async fn resolve(
    tickers_file: Option<&Path>,
    max_tickers: Option<usize>,
    settings: &Settings,
    listed: Option<Vec<String>>,
) -> Result<Vec<String>> {
    let mut symbols = if let Some(path) = tickers_file {
        let list = read_tickers_file(path)?;
        tracing::info!(path = %path.display(), tickers = list.len(), "using explicit ticker file");
        list
    } else if let Some(listed) = listed {
        tracing::info!(tickers = listed.len(), "using tickers from the listings file");
        listed
    } else {
        let raw = composition::download_composition(settings).await?;
        let list = composition::extract_tickers(&raw, composition::start_line(settings));
        tracing::info!(tickers = list.len(), "extracted tickers from index composition");
        list
    };

    if let Some(max) = max_tickers {
        if symbols.len() > max {
            symbols.truncate(max);
            tracing::info!(max, "truncated ticker list");
        }
    }

    Ok(symbols)
}

fn read_tickers_file(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ticker file {}", path.display()))?;
    Ok(parse_tickers(&raw))
}

fn parse_tickers(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
