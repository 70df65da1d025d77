use crate::config::Settings;
use crate::domain::stock::{CompanyProfile, FinancialStats, StockRecord};
use crate::ingest::source::{FetchError, StockSource};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

// {isin} is substituted per stock; the CHF4 segment selects the default
// trading line and has a CHF1 counterpart probed as a fallback.
const DEFAULT_STATS_URL: &str =
    "https://www.six-swiss-exchange.com/shares/info_details_en.html?id={isin}CHF4";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const NO_DATA_MARKER: &str = "No data is available at present";

// The stats page is plain HTML with no machine-readable counterpart, so
// the two screen metrics are pulled out of the markup directly.
static DIVIDEND_YIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Dividend yield - indicated annual dividend.*?valign="top">(.*?)</td>"#).unwrap()
});
static RETURN_ON_ASSETS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Return on assets.*?valign="top">(.*?)</td>"#).unwrap());

/// One row of the prepared listings file (`name;ticker;isin;sector`).
#[derive(Debug, Clone)]
pub struct SixListing {
    pub name: String,
    pub ticker: String,
    pub isin: String,
    pub sector: String,
}

/// Swiss exchange source: resolves tickers through the listings file and
/// scrapes the per-ISIN stats page for the screen metrics.
#[derive(Debug)]
pub struct SixSwissSource {
    http: reqwest::Client,
    stats_url: String,
    listings: BTreeMap<String, SixListing>,
}

impl SixSwissSource {
    pub fn from_listings_file(settings: &Settings, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read swiss listings file {}", path.display()))?;
        Self::from_listings_csv(settings, &raw)
    }

    pub fn from_listings_csv(settings: &Settings, raw: &str) -> Result<Self> {
        let stats_url = settings
            .six_stats_url
            .clone()
            .unwrap_or_else(|| DEFAULT_STATS_URL.to_string());

        let timeout_secs = std::env::var("SIX_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build SIX http client")?;

        let listings = parse_listings(raw);
        anyhow::ensure!(!listings.is_empty(), "swiss listings file has no entries");

        Ok(Self {
            http,
            stats_url,
            listings,
        })
    }

    /// Tickers covered by the listings file, in symbol order.
    pub fn symbols(&self) -> Vec<String> {
        self.listings.keys().cloned().collect()
    }

    fn stats_page_url(&self, isin: &str) -> String {
        self.stats_url.replace("{isin}", isin)
    }

    fn fallback_stats_page_url(&self, isin: &str) -> String {
        self.stats_url
            .replace("{isin}CHF4", "{isin}CHF1")
            .replace("{isin}", isin)
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }
        Ok(body)
    }

    async fn fetch_stats_page(&self, isin: &str) -> Result<String, FetchError> {
        let html = self.get_text(&self.stats_page_url(isin)).await?;
        if !html.contains(NO_DATA_MARKER) {
            return Ok(html);
        }
        self.get_text(&self.fallback_stats_page_url(isin)).await
    }
}

#[async_trait::async_trait]
impl StockSource for SixSwissSource {
    fn source_name(&self) -> &'static str {
        "six"
    }

    fn cache_file_name(&self) -> &'static str {
        "swiss-stocks.json"
    }

    async fn fetch_one(&self, symbol: &str) -> Result<StockRecord, FetchError> {
        let listing = self
            .listings
            .get(symbol)
            .ok_or_else(|| FetchError::UnknownSymbol {
                symbol: symbol.to_string(),
            })?;

        let html = self.fetch_stats_page(&listing.isin).await?;
        if html.contains(NO_DATA_MARKER) {
            tracing::warn!(
                ticker = %symbol,
                isin = %listing.isin,
                "no stats published on either trading line"
            );
        }

        let stats = FinancialStats {
            dividend_yield: extract_metric(&DIVIDEND_YIELD_RE, &html),
            return_on_assets: extract_metric(&RETURN_ON_ASSETS_RE, &html),
            ..FinancialStats::default()
        };

        // The listings file carries a single classification; it stands in
        // for both sector and industry.
        let company = CompanyProfile {
            company_name: Some(listing.name.clone()),
            industry: Some(listing.sector.clone()),
            sector: Some(listing.sector.clone()),
            ..CompanyProfile::default()
        };

        Ok(StockRecord {
            symbol: symbol.to_string(),
            company,
            stats,
            isin: Some(listing.isin.clone()),
        })
    }
}

fn parse_listings(raw: &str) -> BTreeMap<String, SixListing> {
    let mut out = BTreeMap::new();
    for line in raw.lines() {
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        if fields.len() < 4 {
            continue;
        }

        let listing = SixListing {
            name: fields[0].to_string(),
            ticker: fields[1].to_string(),
            isin: fields[2].to_string(),
            sector: fields[3].to_string(),
        };
        if listing.ticker.is_empty() {
            continue;
        }
        out.insert(listing.ticker.clone(), listing);
    }
    out
}

fn extract_metric(re: &Regex, html: &str) -> Option<f64> {
    let caps = re.captures(html)?;
    let raw = caps.get(1)?.as_str().replace('%', "");
    raw.trim().parse::<f64>().ok()
}
