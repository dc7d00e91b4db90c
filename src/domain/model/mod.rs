// src/domain/model/mod.rs
// Core domain models

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instrument symbol, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Normalizes the symbol (trimmed, upper-cased). Only emptiness is
    /// rejected; the provider decides whether the symbol exists.
    pub fn new(symbol: &str) -> Result<Self, String> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err("ticker symbol must not be empty".to_string());
        }
        Ok(Self(symbol.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TickerSymbol {
    fn default() -> Self {
        Self("AAPL".to_string())
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<TickerSymbol> for String {
    fn from(symbol: TickerSymbol) -> Self {
        symbol.0
    }
}

/// Price field plotted on the chart's y-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectedField {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl SelectedField {
    pub const ALL: [SelectedField; 4] = [
        SelectedField::Open,
        SelectedField::High,
        SelectedField::Low,
        SelectedField::Close,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectedField::Open => "Open",
            SelectedField::High => "High",
            SelectedField::Low => "Low",
            SelectedField::Close => "Close",
        }
    }

    /// Reads this field's value out of a record.
    pub fn value_of(&self, record: &PriceRecord) -> Decimal {
        match self {
            SelectedField::Open => record.open,
            SelectedField::High => record.high,
            SelectedField::Low => record.low,
            SelectedField::Close => record.close,
        }
    }
}

impl fmt::Display for SelectedField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectedField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(SelectedField::Open),
            "high" => Ok(SelectedField::High),
            "low" => Ok(SelectedField::Low),
            "close" => Ok(SelectedField::Close),
            other => Err(format!(
                "unknown field '{}', expected one of Open, High, Low, Close",
                other
            )),
        }
    }
}

/// One trading day's observation.
///
/// The provider guarantees `high >= max(open, close)` and
/// `low <= min(open, close)`; nothing here re-checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
    pub dividends: Decimal,
    pub stock_splits: Decimal,
}

impl PriceRecord {
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            dividends: Decimal::ZERO,
            stock_splits: Decimal::ZERO,
        }
    }
}

/// Daily records ordered by ascending date, one per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorts by date and drops duplicate dates, keeping the later
    /// observation (the provider may append a live bar for today).
    pub fn from_records(mut records: Vec<PriceRecord>) -> Self {
        // Stable sort keeps provider order within a date
        records.sort_by_key(|r| r.date);

        let mut deduped: Vec<PriceRecord> = Vec::with_capacity(records.len());
        for record in records {
            match deduped.last_mut() {
                Some(last) if last.date == record.date => *last = record,
                _ => deduped.push(record),
            }
        }

        Self { records: deduped }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceRecord> {
        self.records.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceRecord;
    type IntoIter = std::slice::Iter<'a, PriceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Wall-clock moment of the last successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTimestamp(NaiveDateTime);

impl RefreshTimestamp {
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }

    pub fn at(&self) -> NaiveDateTime {
        self.0
    }

    /// Text shown in the "last updated" slot of the page.
    pub fn display_text(&self) -> String {
        format!("Last updated: {}", self)
    }
}

impl fmt::Display for RefreshTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

/// Trailing window of daily history requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryRange {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl HistoryRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::OneDay => "1d",
            HistoryRange::FiveDays => "5d",
            HistoryRange::OneMonth => "1mo",
            HistoryRange::ThreeMonths => "3mo",
            HistoryRange::SixMonths => "6mo",
            HistoryRange::OneYear => "1y",
            HistoryRange::TwoYears => "2y",
            HistoryRange::FiveYears => "5y",
            HistoryRange::TenYears => "10y",
            HistoryRange::YearToDate => "ytd",
            HistoryRange::Max => "max",
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(HistoryRange::OneDay),
            "5d" => Ok(HistoryRange::FiveDays),
            "1mo" => Ok(HistoryRange::OneMonth),
            "3mo" => Ok(HistoryRange::ThreeMonths),
            "6mo" => Ok(HistoryRange::SixMonths),
            "1y" => Ok(HistoryRange::OneYear),
            "2y" => Ok(HistoryRange::TwoYears),
            "5y" => Ok(HistoryRange::FiveYears),
            "10y" => Ok(HistoryRange::TenYears),
            "ytd" => Ok(HistoryRange::YearToDate),
            "max" => Ok(HistoryRange::Max),
            other => Err(format!("unsupported history range: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_ticker_symbol_normalized() {
        let symbol = TickerSymbol::new("  aapl ").unwrap();
        assert_eq!(symbol.as_str(), "AAPL");
        assert!(TickerSymbol::new("   ").is_err());
    }

    #[test]
    fn test_selected_field_parse_and_default() {
        assert_eq!(SelectedField::default(), SelectedField::Close);
        assert_eq!("open".parse::<SelectedField>().unwrap(), SelectedField::Open);
        assert_eq!(" HIGH ".parse::<SelectedField>().unwrap(), SelectedField::High);
        assert!("volume".parse::<SelectedField>().is_err());
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let series = PriceSeries::from_records(vec![
            PriceRecord::new(day(3), dec!(181), dec!(183), dec!(180), dec!(182), 10),
            PriceRecord::new(day(2), dec!(180), dec!(182), dec!(179), dec!(181), 20),
            PriceRecord::new(day(3), dec!(181), dec!(184), dec!(180), dec!(183), 30),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(day(2)));
        assert_eq!(series.last_date(), Some(day(3)));
        assert_eq!(series.records()[1].close, dec!(183));
        assert_eq!(series.records()[1].volume, 30);
    }

    #[test]
    fn test_refresh_timestamp_display() {
        let at = day(2).and_hms_opt(9, 5, 7).unwrap();
        let stamp = RefreshTimestamp::new(at);
        assert_eq!(stamp.to_string(), "2024-01-02 09:05:07");
        assert_eq!(stamp.display_text(), "Last updated: 2024-01-02 09:05:07");
    }

    #[test]
    fn test_history_range_parse() {
        assert_eq!("1mo".parse::<HistoryRange>().unwrap(), HistoryRange::OneMonth);
        assert_eq!(HistoryRange::default().as_str(), "1mo");
        assert!("1w".parse::<HistoryRange>().is_err());
    }
}
