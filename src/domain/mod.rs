// src/domain/mod.rs
pub mod errors;
pub mod model;
pub mod repository;
pub mod service;

// Re-export common types for convenience
pub use errors::{AppError, AppResult, FetchError, FetchFailureKind, FetchResult};
pub use model::{
    HistoryRange, PriceRecord, PriceSeries, RefreshTimestamp, SelectedField, TickerSymbol,
};
pub use repository::PriceHistoryRepository;
pub use service::{Clock, SystemClock};
