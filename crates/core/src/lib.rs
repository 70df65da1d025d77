pub mod domain;
pub mod ingest;
pub mod screener;
pub mod storage;

pub mod config {
    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub iex_base_url: Option<String>,
        pub iex_api_token: Option<String>,
        pub six_stats_url: Option<String>,
        pub etf_composition_url: Option<String>,
        pub etf_csv_data_line: Option<usize>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                iex_base_url: std::env::var("IEX_BASE_URL").ok(),
                iex_api_token: std::env::var("IEX_API_TOKEN").ok(),
                six_stats_url: std::env::var("SIX_STATS_URL").ok(),
                etf_composition_url: std::env::var("ETF_COMPOSITION_URL").ok(),
                etf_csv_data_line: std::env::var("ETF_CSV_DATA_LINE")
                    .ok()
                    .and_then(|s| s.parse().ok()),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }
    }
}
