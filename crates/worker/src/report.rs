use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use stocksift_core::domain::dataset::Dataset;
use stocksift_core::domain::stock::StockRecord;

struct Column {
    header: &'static str,
    value: fn(&StockRecord) -> String,
}

// Lead columns mirror what the screen ranks on; the console table stops
// here.
const SUMMARY_COLUMNS: &[Column] = &[
    Column {
        header: "Ticker",
        value: |r| r.symbol.clone(),
    },
    Column {
        header: "Company",
        value: |r| opt_str(&r.company.company_name),
    },
    Column {
        header: "Sector",
        value: |r| opt_str(&r.company.sector),
    },
    Column {
        header: "Dividend Yield",
        value: |r| opt_f64(r.stats.dividend_yield),
    },
    Column {
        header: "ROA",
        value: |r| opt_f64(r.stats.return_on_assets),
    },
];

const CSV_COLUMNS: &[Column] = &[
    Column {
        header: "Ticker",
        value: |r| r.symbol.clone(),
    },
    Column {
        header: "Company",
        value: |r| opt_str(&r.company.company_name),
    },
    Column {
        header: "Sector",
        value: |r| opt_str(&r.company.sector),
    },
    Column {
        header: "Dividend Yield",
        value: |r| opt_f64(r.stats.dividend_yield),
    },
    Column {
        header: "ROA",
        value: |r| opt_f64(r.stats.return_on_assets),
    },
    Column {
        header: "Industry",
        value: |r| opt_str(&r.company.industry),
    },
    Column {
        header: "Exchange",
        value: |r| opt_str(&r.company.exchange),
    },
    Column {
        header: "ISIN",
        value: |r| r.isin.clone().unwrap_or_default(),
    },
    Column {
        header: "Market Cap",
        value: |r| opt_i64(r.stats.marketcap),
    },
    Column {
        header: "Dividend Rate",
        value: |r| opt_f64(r.stats.dividend_rate),
    },
    Column {
        header: "P/E High",
        value: |r| opt_f64(r.stats.pe_ratio_high),
    },
    Column {
        header: "P/E Low",
        value: |r| opt_f64(r.stats.pe_ratio_low),
    },
    Column {
        header: "Price/Book",
        value: |r| opt_f64(r.stats.price_to_book),
    },
    Column {
        header: "Profit Margin",
        value: |r| opt_f64(r.stats.profit_margin),
    },
    Column {
        header: "Return on Equity",
        value: |r| opt_f64(r.stats.return_on_equity),
    },
    Column {
        header: "EPS (ttm)",
        value: |r| opt_f64(r.stats.ttm_eps),
    },
    Column {
        header: "52w High",
        value: |r| opt_f64(r.stats.week52_high),
    },
    Column {
        header: "52w Low",
        value: |r| opt_f64(r.stats.week52_low),
    },
    Column {
        header: "YTD Change",
        value: |r| opt_f64(r.stats.ytd_change_percent),
    },
    Column {
        header: "Shares Outstanding",
        value: |r| opt_i64(r.stats.shares_outstanding),
    },
    Column {
        header: "Website",
        value: |r| opt_str(&r.company.website),
    },
];

/// Render the selection as an aligned console table, best pick first.
pub fn print_selection(selection: &[&StockRecord]) {
    if selection.is_empty() {
        println!("No stocks selected.");
        return;
    }

    let rows: Vec<Vec<String>> = selection
        .iter()
        .map(|r| SUMMARY_COLUMNS.iter().map(|c| (c.value)(r)).collect())
        .collect();

    let mut widths: Vec<usize> = SUMMARY_COLUMNS.iter().map(|c| c.header.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let header: Vec<String> = SUMMARY_COLUMNS
        .iter()
        .zip(widths.iter().copied())
        .map(|(c, width)| format!("{:<width$}", c.header))
        .collect();
    println!("{}", header.join("  "));
    println!(
        "{}",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

/// Write the selection CSV at `path` and the full universe next to it as
/// `<stem>-universe.<ext>`.
pub fn write_csv_reports(
    path: &Path,
    selection: &[&StockRecord],
    dataset: &Dataset,
) -> Result<()> {
    write_csv(path, selection.iter().copied())?;
    tracing::info!(path = %path.display(), rows = selection.len(), "selection report written");

    let universe_path = with_suffix(path, "-universe");
    write_csv(&universe_path, dataset.records())?;
    tracing::info!(path = %universe_path.display(), rows = dataset.len(), "universe report written");

    Ok(())
}

fn write_csv<'a>(path: &Path, rows: impl Iterator<Item = &'a StockRecord>) -> Result<()> {
    let mut out = String::new();
    let headers: Vec<&str> = CSV_COLUMNS.iter().map(|c| c.header).collect();
    out.push_str(&headers.join(","));
    out.push('\n');

    for record in rows {
        let cells: Vec<String> = CSV_COLUMNS
            .iter()
            .map(|c| csv_field(&(c.value)(record)))
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }

    std::fs::write(path, out)
        .with_context(|| format!("failed to write report {}", path.display()))
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    path.with_file_name(format!("{stem}{suffix}.{ext}"))
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_f64(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn opt_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
