// src/application/dto/mod.rs
// Data transfer objects exchanged with the presentation layer and the provider

pub mod chart_response;
pub mod parser;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

use crate::domain::model::SelectedField;

/// Inbound events from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The y-axis dropdown changed.
    FieldSelected(SelectedField),
}

/// Outbound updates for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Chart(ChartSpec),
    Table(Vec<TableRow>),
    LastUpdated(String),
}

/// Outputs of one successful refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUpdate {
    pub rows: Vec<TableRow>,
    pub last_updated: String,
}

/// A single plotted point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Line-chart description consumed by the graphing widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn x_values(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn y_values(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Plotly-style figure: one `scatter` trace in line mode.
    pub fn to_figure(&self) -> Value {
        let x: Vec<String> = self.points.iter().map(|p| p.date.to_string()).collect();
        json!({
            "data": [{
                "type": "scatter",
                "mode": "lines",
                "x": x,
                "y": self.y_values(),
            }],
            "layout": {
                "title": { "text": self.title },
                "xaxis": { "title": { "text": self.x_label } },
                "yaxis": { "title": { "text": self.y_label } },
            }
        })
    }
}

/// Grid columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    Dividends,
    StockSplits,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Date,
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
        Column::Dividends,
        Column::StockSplits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::Volume => "Volume",
            Column::Dividends => "Dividends",
            Column::StockSplits => "Stock Splits",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column definition handed to the grid widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub field: &'static str,
}

/// Generic key-value row for the grid, keyed by column label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableRow(Map<String, Value>);

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: Column, value: Value) {
        self.0.insert(column.as_str().to_string(), value);
    }

    pub fn get(&self, column: Column) -> Option<&Value> {
        self.0.get(column.as_str())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.get(Column::Date)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Cell rendered as plain text; empty when the column is absent.
    pub fn cell_text(&self, column: Column) -> String {
        match self.get(column) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
