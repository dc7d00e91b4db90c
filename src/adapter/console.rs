// src/adapter/console.rs
// Terminal host: stdin lines become dropdown events, view updates are printed

use std::io::BufRead;
use tokio::sync::mpsc;

use crate::application::dto::{ChartSpec, Column, TableRow, UiEvent, ViewUpdate};
use crate::application::usecase::table_columns;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::model::SelectedField;

/// Forward field names typed by the user as selection events.
///
/// Blocking; run it on a dedicated thread. Returns at end of input or once
/// the coordinator stops listening.
pub fn read_ui_events<R: BufRead>(reader: R, sender: &mpsc::Sender<UiEvent>) -> AppResult<()> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.parse::<SelectedField>() {
            Ok(field) => {
                if sender.blocking_send(UiEvent::FieldSelected(field)).is_err() {
                    return Err(AppError::Channel("UI channel closed".to_string()));
                }
            }
            Err(e) => log::warn!("Ignoring input: {}", e),
        }
    }

    log::debug!("End of console input");
    Ok(())
}

/// Print view updates until the coordinator drops its sender.
pub async fn print_updates(mut receiver: mpsc::Receiver<ViewUpdate>) {
    while let Some(update) = receiver.recv().await {
        println!("{}", render(&update));
    }
}

pub fn render(update: &ViewUpdate) -> String {
    match update {
        ViewUpdate::Chart(chart) => render_chart(chart),
        ViewUpdate::Table(rows) => render_table(rows),
        ViewUpdate::LastUpdated(text) => text.clone(),
    }
}

fn render_chart(chart: &ChartSpec) -> String {
    let mut out = format!("== {} ==", chart.title);
    if chart.points.is_empty() {
        out.push_str("\n(no data)");
    }
    for point in &chart.points {
        out.push_str(&format!("\n{}  {}", point.date, point.value));
    }
    out
}

fn render_table(rows: &[TableRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| Column::ALL.iter().map(|c| row.cell_text(*c)).collect())
        .collect();

    let widths: Vec<usize> = Column::ALL
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.as_str().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |values: Vec<String>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:>width$}", value, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = vec![format_line(
        table_columns().iter().map(|c| c.field.to_string()).collect(),
    )];
    lines.extend(cells.into_iter().map(format_line));
    lines.join("\n")
}
