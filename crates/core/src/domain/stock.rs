use serde::{Deserialize, Serialize};

/// Descriptive issuer attributes as reported by the upstream company endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(rename = "CEO")]
    pub ceo: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
    pub issue_type: Option<String>,
    pub sector: Option<String>,
    pub symbol: Option<String>,
    pub website: Option<String>,
}

/// Per-stock metrics as reported by the upstream stats endpoint.
///
/// Every metric is independently optional; a missing or unparseable value
/// stays `None` and never fails the whole record. `dividend_yield` and
/// `return_on_assets` drive the screen, the rest are carried for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStats {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub beta: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub cash: Option<i64>,
    pub company_name: Option<String>,
    #[serde(rename = "consensusEPS", default, deserialize_with = "lenient_f64")]
    pub consensus_eps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub day200_moving_avg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub day50_moving_avg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub day5_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub debt: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dividend_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "EBITDA", default, deserialize_with = "lenient_i64")]
    pub ebitda: Option<i64>,
    #[serde(rename = "EPSSurpriseDollar", default, deserialize_with = "lenient_f64")]
    pub eps_surprise_dollar: Option<f64>,
    #[serde(rename = "EPSSurprisePercent", default, deserialize_with = "lenient_f64")]
    pub eps_surprise_percent: Option<f64>,
    pub ex_dividend_date: Option<String>,
    #[serde(rename = "float", default, deserialize_with = "lenient_i64")]
    pub shares_float: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub gross_profit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub insider_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub institution_percent: Option<f64>,
    #[serde(rename = "latestEPS", default, deserialize_with = "lenient_f64")]
    pub latest_eps: Option<f64>,
    #[serde(rename = "latestEPSDate")]
    pub latest_eps_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub marketcap: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub month1_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub month3_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub month6_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub number_of_estimates: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pe_ratio_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pe_ratio_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_to_book: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_to_sales: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub profit_margin: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub return_on_assets: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub return_on_capital: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub return_on_equity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub revenue: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub revenue_per_employee: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub revenue_per_share: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub shares_outstanding: Option<i64>,
    pub short_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub short_interest: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub short_ratio: Option<f64>,
    pub symbol: Option<String>,
    #[serde(rename = "ttmEPS", default, deserialize_with = "lenient_f64")]
    pub ttm_eps: Option<f64>,
    #[serde(rename = "week52change", default, deserialize_with = "lenient_f64")]
    pub week52_change: Option<f64>,
    #[serde(rename = "week52high", default, deserialize_with = "lenient_f64")]
    pub week52_high: Option<f64>,
    #[serde(rename = "week52low", default, deserialize_with = "lenient_f64")]
    pub week52_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub year1_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub year2_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub year5_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ytd_change_percent: Option<f64>,
}

/// One fully fetched stock: the ticker plus the company and stats payloads
/// from a single upstream response pair. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub symbol: String,
    pub company: CompanyProfile,
    pub stats: FinancialStats,
    pub isin: Option<String>,
}

impl StockRecord {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company: CompanyProfile::default(),
            stats: FinancialStats::default(),
            isin: None,
        }
    }

    /// Sector used for the quota walk. Records without one group under "".
    pub fn sector(&self) -> &str {
        self.company.sector.as_deref().unwrap_or("")
    }
}

// Upstream numeric fields arrive as numbers, numeric strings, or junk
// depending on the endpoint and era; anything unparseable becomes None.
fn lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_i64<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}
