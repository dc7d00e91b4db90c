// src/application/dto/chart_response.rs
// Wire format of the Yahoo Finance v8 chart endpoint

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,

    /// Bar open times, unix seconds. Omitted when the window holds no bars.
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,

    #[serde(default)]
    pub events: Option<ChartEvents>,

    pub indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: Option<String>,

    #[serde(default)]
    pub currency: Option<String>,

    /// Exchange offset from UTC, seconds.
    #[serde(default)]
    pub gmtoffset: i64,

    /// Decimal places prices are quoted with.
    #[serde(default)]
    pub price_hint: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartEvents {
    #[serde(default)]
    pub dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    pub splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
pub struct DividendEvent {
    pub amount: f64,
    pub date: i64,
}

#[derive(Debug, Deserialize)]
pub struct SplitEvent {
    pub date: i64,
    pub numerator: f64,
    pub denominator: f64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,

    /// Close adjusted for dividends and splits. Absent on some intervals.
    #[serde(default)]
    pub adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// Column-oriented bars; any entry may be null on data gaps.
#[derive(Debug, Default, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}
