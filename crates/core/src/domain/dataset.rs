use crate::domain::stock::StockRecord;
use std::collections::BTreeMap;

/// The assembled universe for one screening run: at most one record per
/// symbol, iteration in symbol order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    stocks: BTreeMap<String, StockRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<StockRecord>) -> Self {
        let mut dataset = Self::new();
        for record in records {
            dataset.insert(record);
        }
        dataset
    }

    /// Keyed by the record's own symbol; a second record for the same
    /// symbol replaces the first.
    pub fn insert(&mut self, record: StockRecord) -> Option<StockRecord> {
        self.stocks.insert(record.symbol.clone(), record)
    }

    pub fn get(&self, symbol: &str) -> Option<&StockRecord> {
        self.stocks.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.stocks.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &StockRecord> {
        self.stocks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_records_with_the_same_symbol() {
        let mut dataset = Dataset::new();

        let mut first = StockRecord::new("AAPL");
        first.stats.dividend_yield = Some(1.0);
        assert!(dataset.insert(first).is_none());

        let mut second = StockRecord::new("AAPL");
        second.stats.dividend_yield = Some(2.0);
        let replaced = dataset.insert(second);

        assert_eq!(dataset.len(), 1);
        assert_eq!(replaced.unwrap().stats.dividend_yield, Some(1.0));
        assert_eq!(
            dataset.get("AAPL").unwrap().stats.dividend_yield,
            Some(2.0)
        );
    }

    #[test]
    fn records_iterate_in_symbol_order() {
        let mut dataset = Dataset::new();
        dataset.insert(StockRecord::new("MSFT"));
        dataset.insert(StockRecord::new("AAPL"));
        dataset.insert(StockRecord::new("GOOG"));

        let symbols: Vec<&str> = dataset.records().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "GOOG", "MSFT"]);
    }
}
