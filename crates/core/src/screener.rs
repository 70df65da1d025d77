use crate::domain::dataset::Dataset;
use crate::domain::stock::StockRecord;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_TOP_BY_YIELD: usize = 200;
pub const DEFAULT_MAX_PER_SECTOR: usize = 5;
pub const DEFAULT_MAX_PICKS: usize = 20;

/// Thresholds for one screening run.
#[derive(Debug, Clone)]
pub struct SelectionParams {
    /// Stage 1: how many stocks, ranked by dividend yield, enter the
    /// screen. Everything below the cut is never considered again.
    pub top_by_yield: usize,

    /// Stage 3: per-sector quota for the final walk.
    pub max_per_sector: usize,

    /// Stage 3: overall size of the final selection.
    pub max_picks: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            top_by_yield: DEFAULT_TOP_BY_YIELD,
            max_per_sector: DEFAULT_MAX_PER_SECTOR,
            max_picks: DEFAULT_MAX_PICKS,
        }
    }
}

/// Run the three-stage screen over a dataset and return the selection,
/// best candidate first.
///
/// 1. Keep the `top_by_yield` stocks with the highest dividend yield.
/// 2. Rank those by return on assets, descending.
/// 3. Walk the ranking and admit stocks under a per-sector quota until
///    `max_picks` are selected.
///
/// Both sorts place stocks with an absent metric after every stock with a
/// present one (zero included) and break exact ties by symbol, so the
/// selection is fully deterministic for a given dataset.
///
/// The quota walk counts every ranked stock of a sector, admitted or
/// skipped, and admits while that count before the current stock is at
/// most `max_per_sector`. A sector can therefore contribute up to
/// `max_per_sector + 1` picks, and once a sector starts being skipped it
/// stays skipped.
///
/// Any threshold of zero produces an empty selection. Never fails.
pub fn pick_stocks<'a>(dataset: &'a Dataset, params: &SelectionParams) -> Vec<&'a StockRecord> {
    if params.top_by_yield == 0 || params.max_per_sector == 0 || params.max_picks == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<&StockRecord> = dataset.records().collect();
    candidates.sort_by(|a, b| {
        cmp_metric_desc(a.stats.dividend_yield, b.stats.dividend_yield)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    candidates.truncate(params.top_by_yield);

    candidates.sort_by(|a, b| {
        cmp_metric_desc(a.stats.return_on_assets, b.stats.return_on_assets)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    let mut selection = Vec::new();
    let mut sector_seen: BTreeMap<&str, usize> = BTreeMap::new();
    for record in candidates {
        let seen = sector_seen.entry(record.sector()).or_insert(0);
        let before = *seen;
        *seen += 1;

        if before > params.max_per_sector {
            continue;
        }

        selection.push(record);
        if selection.len() == params.max_picks {
            break;
        }
    }

    selection
}

// Descending on the metric; absent sorts after any present value. NaN
// compares equal, leaving the symbol tie-break to settle the order.
fn cmp_metric_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, sector: &str, yield_pct: Option<f64>, roa: Option<f64>) -> StockRecord {
        let mut record = StockRecord::new(symbol);
        record.company.sector = Some(sector.to_string());
        record.stats.dividend_yield = yield_pct;
        record.stats.return_on_assets = roa;
        record
    }

    fn dataset(records: Vec<StockRecord>) -> Dataset {
        Dataset::from_records(records)
    }

    fn params(top_by_yield: usize, max_per_sector: usize, max_picks: usize) -> SelectionParams {
        SelectionParams {
            top_by_yield,
            max_per_sector,
            max_picks,
        }
    }

    fn symbols(selection: &[&StockRecord]) -> Vec<String> {
        selection.iter().map(|r| r.symbol.clone()).collect()
    }

    #[test]
    fn any_zero_threshold_selects_nothing() {
        let data = dataset(vec![record("AAPL", "Tech", Some(2.0), Some(10.0))]);

        assert!(pick_stocks(&data, &params(0, 5, 20)).is_empty());
        assert!(pick_stocks(&data, &params(200, 0, 20)).is_empty());
        assert!(pick_stocks(&data, &params(200, 5, 0)).is_empty());
    }

    #[test]
    fn empty_dataset_selects_nothing() {
        assert!(pick_stocks(&Dataset::new(), &SelectionParams::default()).is_empty());
    }

    #[test]
    fn yield_cut_excludes_high_roa_stocks_below_the_line() {
        // 500 stocks with strictly descending yield; the lowest-yield one
        // carries a dominating ROA and must still be cut in stage 1.
        let mut records = Vec::new();
        for i in 0..500usize {
            let yield_pct = (500 - i) as f64 / 100.0;
            let roa = if i == 499 { 99.0 } else { 5.0 };
            let sector = format!("Sector{}", i % 40);
            records.push(record(&format!("S{i:03}"), &sector, Some(yield_pct), Some(roa)));
        }
        let data = dataset(records);

        let selection = pick_stocks(&data, &params(200, 5, 20));

        assert_eq!(selection.len(), 20);
        assert!(selection.iter().all(|r| r.symbol != "S499"));
        // Only stage-1 survivors (the 200 highest yields: S000..S199) appear.
        assert!(selection
            .iter()
            .all(|r| r.symbol[1..].parse::<usize>().unwrap() < 200));
    }

    #[test]
    fn a_dominant_sector_is_capped_and_the_rest_fill_up() {
        // 50 "Tech" stocks out-rank everything on ROA; with K=5 the sector
        // caps at six picks and the remaining slots go to other sectors.
        let mut records = Vec::new();
        for i in 0..50usize {
            records.push(record(
                &format!("T{i:02}"),
                "Tech",
                Some(5.0),
                Some(90.0 - i as f64),
            ));
        }
        for i in 0..30usize {
            records.push(record(
                &format!("U{i:02}"),
                &format!("Other{}", i % 3),
                Some(4.0),
                Some(10.0 - (i % 7) as f64),
            ));
        }
        let data = dataset(records);

        let selection = pick_stocks(&data, &params(200, 5, 20));

        assert_eq!(selection.len(), 20);
        let tech = selection.iter().filter(|r| r.sector() == "Tech").count();
        assert_eq!(tech, 6);
        assert_eq!(
            symbols(&selection)[..6],
            ["T00", "T01", "T02", "T03", "T04", "T05"]
        );
    }

    #[test]
    fn sector_quota_admits_one_past_the_limit_then_skips_for_good() {
        // All of sector A outranks sector B on ROA; with K=2 each sector
        // admits its 1st..3rd stocks and skips from the 4th on.
        let mut records = Vec::new();
        for i in 0..8usize {
            records.push(record(&format!("A{i}"), "A", Some(3.0), Some(80.0 - i as f64)));
        }
        for i in 0..8usize {
            records.push(record(&format!("B{i}"), "B", Some(3.0), Some(40.0 - i as f64)));
        }
        let data = dataset(records);

        let selection = pick_stocks(&data, &params(200, 2, 100));

        let picked = symbols(&selection);
        let a_picks: Vec<&str> = picked
            .iter()
            .filter(|s| s.starts_with('A'))
            .map(String::as_str)
            .collect();
        let b_picks: Vec<&str> = picked
            .iter()
            .filter(|s| s.starts_with('B'))
            .map(String::as_str)
            .collect();

        // Boundary: the (K+1)-th sector stock is admitted.
        assert_eq!(a_picks, ["A0", "A1", "A2"]);
        // One past the boundary (A3) and everything after it is skipped.
        assert!(!picked.iter().any(|s| s == "A3"));
        assert_eq!(b_picks, ["B0", "B1", "B2"]);
    }

    #[test]
    fn skipped_sector_stocks_still_advance_the_sector_count() {
        // All of sector A outranks B. A4..A7 are skipped by the quota but
        // still counted, so A never re-admits later in the walk.
        let mut records = Vec::new();
        for i in 0..10usize {
            records.push(record(&format!("A{i}"), "A", Some(3.0), Some(90.0 - i as f64)));
        }
        records.push(record("B0", "B", Some(3.0), Some(1.0)));
        let data = dataset(records);

        let selection = pick_stocks(&data, &params(200, 2, 4));

        assert_eq!(symbols(&selection), ["A0", "A1", "A2", "B0"]);
    }

    #[test]
    fn selection_is_deterministic_and_ties_order_by_symbol() {
        let build = || {
            dataset(vec![
                record("DDD", "X", Some(2.0), Some(7.0)),
                record("AAA", "X", Some(2.0), Some(7.0)),
                record("CCC", "Y", Some(2.0), Some(7.0)),
                record("BBB", "Y", Some(2.0), Some(7.0)),
            ])
        };

        let data = build();
        let first = symbols(&pick_stocks(&data, &params(10, 5, 10)));
        let again = symbols(&pick_stocks(&data, &params(10, 5, 10)));
        let rebuilt = build();
        let other = symbols(&pick_stocks(&rebuilt, &params(10, 5, 10)));

        assert_eq!(first, ["AAA", "BBB", "CCC", "DDD"]);
        assert_eq!(first, again);
        assert_eq!(first, other);
    }

    #[test]
    fn absent_metrics_sort_below_zero_not_equal_to_it() {
        // N=2: the zero-yield stock survives the cut, the absent-yield one
        // does not.
        let data = dataset(vec![
            record("HIGH", "X", Some(3.0), Some(1.0)),
            record("ZERO", "X", Some(0.0), Some(50.0)),
            record("NONE", "X", None, Some(99.0)),
        ]);

        let selection = pick_stocks(&data, &params(2, 5, 10));
        let picked = symbols(&selection);

        assert!(picked.contains(&"ZERO".to_string()));
        assert!(!picked.contains(&"NONE".to_string()));

        // Same rule for the ROA ranking: absent ROA ranks last.
        let data = dataset(vec![
            record("R0", "X", Some(3.0), Some(0.0)),
            record("RN", "X", Some(3.0), None),
        ]);
        let selection = pick_stocks(&data, &params(10, 5, 10));
        assert_eq!(symbols(&selection), ["R0", "RN"]);
    }

    #[test]
    fn three_sector_scenario_selects_five_ordered_by_roa() {
        // Three sectors with ten stocks each, yields uniformly descending,
        // ROA from a fixed pseudo-random sequence.
        let sectors = ["Energy", "Health", "Utilities"];
        let mut records = Vec::new();
        for i in 0..30usize {
            let yield_pct = 10.0 - (i as f64) * 0.33;
            let roa = ((i * 37) % 97) as f64 / 10.0;
            records.push(record(
                &format!("S{i:02}"),
                sectors[i % 3],
                Some(yield_pct),
                Some(roa),
            ));
        }
        let data = dataset(records);

        let selection = pick_stocks(&data, &params(15, 2, 5));

        assert_eq!(selection.len(), 5);

        // Everything picked sits inside the top-15-by-yield subset, which
        // here is exactly S00..S14.
        for r in &selection {
            let idx: usize = r.symbol[1..].parse().unwrap();
            assert!(idx < 15, "{} is outside the yield cut", r.symbol);
        }

        // No sector exceeds K+1 picks.
        let mut per_sector: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &selection {
            *per_sector.entry(r.sector()).or_insert(0) += 1;
        }
        assert!(per_sector.values().all(|&n| n <= 3));

        // Ranked by ROA, best first.
        let roas: Vec<f64> = selection
            .iter()
            .map(|r| r.stats.return_on_assets.unwrap())
            .collect();
        assert!(roas.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn fewer_candidates_than_the_thresholds_returns_what_exists() {
        let data = dataset(vec![
            record("AAA", "X", Some(2.0), Some(5.0)),
            record("BBB", "Y", Some(1.0), Some(9.0)),
        ]);

        let selection = pick_stocks(&data, &SelectionParams::default());
        assert_eq!(symbols(&selection), ["BBB", "AAA"]);
    }
}
