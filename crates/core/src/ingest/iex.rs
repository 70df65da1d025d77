use crate::config::Settings;
use crate::domain::stock::{CompanyProfile, FinancialStats, StockRecord};
use crate::ingest::source::{FetchError, StockSource};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.iextrading.com/1.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// IEX-style JSON API source. A record needs two calls per symbol, the
/// stats payload and the company payload; both must succeed.
#[derive(Debug, Clone)]
pub struct IexSource {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl IexSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .iex_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_token = settings.iex_api_token.clone();

        let timeout_secs = std::env::var("IEX_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build IEX http client")?;

        Ok(Self {
            http,
            base_url,
            api_token,
        })
    }

    fn stock_url(&self, symbol: &str, leaf: &str) -> String {
        format!(
            "{}/stock/{}/{}",
            self.base_url.trim_end_matches('/'),
            symbol,
            leaf
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        symbol: &str,
        url: &str,
    ) -> Result<T, FetchError> {
        let mut req = self.http.get(url);
        if let Some(token) = &self.api_token {
            req = req.query(&[("token", token.as_str())]);
        }

        let res = req.send().await?;
        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::UnknownSymbol {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait::async_trait]
impl StockSource for IexSource {
    fn source_name(&self) -> &'static str {
        "iex"
    }

    fn cache_file_name(&self) -> &'static str {
        "iex-stocks.json"
    }

    async fn fetch_one(&self, symbol: &str) -> Result<StockRecord, FetchError> {
        let stats: FinancialStats = self
            .get_json(symbol, &self.stock_url(symbol, "stats"))
            .await?;
        let company: CompanyProfile = self
            .get_json(symbol, &self.stock_url(symbol, "company"))
            .await?;

        Ok(StockRecord {
            symbol: symbol.to_string(),
            company,
            stats,
            isin: None,
        })
    }
}
