// src/domain/repository/mod.rs
// Repository interfaces for domain entities

use async_trait::async_trait;
use crate::domain::errors::FetchResult;
use crate::domain::model::{PriceSeries, TickerSymbol};

/// Source of daily price history for one instrument.
#[async_trait]
pub trait PriceHistoryRepository {
    /// Fetch the trailing window of daily bars for `ticker`.
    ///
    /// Returns an empty series when the provider has nothing for the window
    /// (including unknown symbols); `Err` is reserved for transport, provider
    /// and decoding failures.
    async fn fetch_history(&self, ticker: &TickerSymbol) -> FetchResult<PriceSeries>;
}
