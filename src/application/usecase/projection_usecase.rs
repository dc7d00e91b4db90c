// src/application/usecase/projection_usecase.rs
// Projections of a price series into chart and grid form

use serde_json::{json, Value};

use crate::application::dto::{ChartPoint, ChartSpec, Column, ColumnDef, TableRow};
use crate::domain::model::{PriceRecord, PriceSeries, SelectedField, TickerSymbol};

/// Line chart of `field` over time. Same inputs always give an equal chart.
pub fn to_chart(series: &PriceSeries, ticker: &TickerSymbol, field: SelectedField) -> ChartSpec {
    let points = series
        .iter()
        .map(|record| ChartPoint {
            date: record.date,
            value: field.value_of(record),
        })
        .collect();

    ChartSpec {
        title: format!("{} - {} Price", ticker, field),
        x_label: Column::Date.as_str().to_string(),
        y_label: field.as_str().to_string(),
        points,
    }
}

/// One grid row per record, in series order.
pub fn to_table_rows(series: &PriceSeries) -> Vec<TableRow> {
    series.iter().map(to_table_row).collect()
}

/// Column definitions for the grid, in display order.
pub fn table_columns() -> Vec<ColumnDef> {
    Column::ALL
        .iter()
        .map(|c| ColumnDef { field: c.as_str() })
        .collect()
}

fn to_table_row(record: &PriceRecord) -> TableRow {
    let mut row = TableRow::new();
    for column in Column::ALL {
        row.insert(column, cell_value(record, column));
    }
    row
}

fn cell_value(record: &PriceRecord, column: Column) -> Value {
    match column {
        Column::Date => json!(record.date.to_string()),
        Column::Open => json!(record.open),
        Column::High => json!(record.high),
        Column::Low => json!(record.low),
        Column::Close => json!(record.close),
        Column::Volume => json!(record.volume),
        Column::Dividends => json!(record.dividends),
        Column::StockSplits => json!(record.stock_splits),
    }
}
