use crate::config::Settings;
use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_COMPOSITION_URL: &str = "https://www.ishares.com/us/products/239707/ishares-russell-1000-etf/1467271812596.ajax?fileType=csv&fileName=IWB_holdings&dataType=fund";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// The holdings CSV opens with a fund-metadata preamble and a header row;
// the actual table starts this many lines in.
const DEFAULT_DATA_START_LINE: usize = 11;

/// Download the index composition CSV listing the fund's holdings.
pub async fn download_composition(settings: &Settings) -> Result<String> {
    let url = settings
        .etf_composition_url
        .clone()
        .unwrap_or_else(|| DEFAULT_COMPOSITION_URL.to_string());

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .context("failed to build composition http client")?;

    let res = http
        .get(&url)
        .send()
        .await
        .context("composition download failed")?;
    let status = res.status();
    let body = res
        .text()
        .await
        .context("failed to read composition body")?;
    anyhow::ensure!(status.is_success(), "composition HTTP {status}");

    Ok(body)
}

pub fn start_line(settings: &Settings) -> usize {
    settings.etf_csv_data_line.unwrap_or(DEFAULT_DATA_START_LINE)
}

/// Pull the ticker column out of the holdings CSV. Rows start at
/// `start_line`; the first cell of each row is the ticker, quotes
/// stripped. The table ends at the first row with an empty ticker cell.
pub fn extract_tickers(raw_csv: &str, start_line: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in raw_csv.lines().skip(start_line) {
        let ticker = line
            .split(',')
            .next()
            .unwrap_or_default()
            .replace('"', "");
        let ticker = ticker.trim();
        if ticker.is_empty() {
            break;
        }
        out.push(ticker.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_column_tickers_after_the_preamble() {
        let csv = "\
Fund Holdings as of,\"Aug 20, 2026\"
Inception Date,\"May 15, 2000\"

Ticker,Name,Sector,Asset Class,Market Value
\"AAPL\",\"APPLE INC\",Information Technology,Equity,\"1,000\"
MSFT,MICROSOFT CORP,Information Technology,Equity,\"2,000\"
\"BRK.B\",\"BERKSHIRE HATHAWAY INC CLASS B\",Financials,Equity,\"3,000\"

The content above is subject to change.";

        let tickers = extract_tickers(csv, 4);
        assert_eq!(tickers, vec!["AAPL", "MSFT", "BRK.B"]);
    }

    #[test]
    fn start_line_comes_from_settings_with_a_compiled_in_default() {
        assert_eq!(start_line(&Settings::default()), DEFAULT_DATA_START_LINE);

        let settings = Settings {
            etf_csv_data_line: Some(4),
            ..Settings::default()
        };
        assert_eq!(start_line(&settings), 4);
    }

    #[test]
    fn start_line_past_the_end_means_no_tickers() {
        let tickers = extract_tickers("a,b\nc,d\n", 10);
        assert!(tickers.is_empty());
    }

    #[test]
    fn stops_at_the_first_blank_row() {
        let csv = "X,1\nY,2\n\nfooter disclaimer text,";
        let tickers = extract_tickers(csv, 0);
        assert_eq!(tickers, vec!["X", "Y"]);
    }
}
