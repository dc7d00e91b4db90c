pub mod projection_usecase;

// Re-export public API
pub use projection_usecase::{table_columns, to_chart, to_table_rows};
