// src/application/service/mod.rs
// Application services

use std::sync::Arc;
use async_trait::async_trait;

use crate::application::dto::{ChartSpec, DataUpdate, TableRow};
use crate::application::usecase::{to_chart, to_table_rows};
use crate::domain::errors::FetchFailureKind;
use crate::domain::model::{PriceSeries, RefreshTimestamp, SelectedField, TickerSymbol};
use crate::domain::repository::PriceHistoryRepository;
use crate::domain::service::Clock;

#[async_trait]
pub trait DashboardService {
    /// Fetch fresh history and publish it.
    ///
    /// Returns the new grid rows and "last updated" text on success, `None`
    /// when the fetch failed and the previous data stays in effect.
    async fn refresh(&mut self, tick: u64) -> Option<DataUpdate>;

    /// Record a dropdown change and project the chart for it.
    fn select_field(&mut self, field: SelectedField) -> ChartSpec;

    /// Chart for the current series and field.
    fn current_chart(&self) -> ChartSpec;

    /// Grid rows for the current series.
    fn current_rows(&self) -> Vec<TableRow>;

    fn state(&self) -> &DashboardState;
}

/// Everything the dashboard shows, owned by a single service.
#[derive(Debug, Clone)]
pub struct DashboardState {
    ticker: TickerSymbol,
    series: Arc<PriceSeries>,
    field: SelectedField,
    last_updated: Option<RefreshTimestamp>,
    last_failure: Option<FetchFailureKind>,
}

impl DashboardState {
    pub fn new(ticker: TickerSymbol) -> Self {
        Self {
            ticker,
            series: Arc::new(PriceSeries::empty()),
            field: SelectedField::default(),
            last_updated: None,
            last_failure: None,
        }
    }

    pub fn ticker(&self) -> &TickerSymbol {
        &self.ticker
    }

    pub fn series(&self) -> Arc<PriceSeries> {
        self.series.clone()
    }

    pub fn field(&self) -> SelectedField {
        self.field
    }

    pub fn last_updated(&self) -> Option<RefreshTimestamp> {
        self.last_updated
    }

    /// Category of the last refresh if it failed; cleared by a success.
    pub fn last_failure(&self) -> Option<FetchFailureKind> {
        self.last_failure
    }
}

pub struct DashboardServiceImpl {
    repository: Arc<dyn PriceHistoryRepository + Send + Sync>,
    clock: Box<dyn Clock + Send + Sync>,
    state: DashboardState,
}

impl DashboardServiceImpl {
    pub fn new(
        ticker: TickerSymbol,
        repository: Arc<dyn PriceHistoryRepository + Send + Sync>,
        clock: Box<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            clock,
            state: DashboardState::new(ticker),
        }
    }
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    async fn refresh(&mut self, tick: u64) -> Option<DataUpdate> {
        let ticker = self.state.ticker.clone();

        match self.repository.fetch_history(&ticker).await {
            Ok(series) => {
                if series.is_empty() {
                    log::warn!("Refresh #{}: provider returned no data for {}", tick, ticker);
                } else {
                    log::info!(
                        "Refresh #{}: {} records for {} ({} .. {})",
                        tick,
                        series.len(),
                        ticker,
                        series.first_date().map(|d| d.to_string()).unwrap_or_default(),
                        series.last_date().map(|d| d.to_string()).unwrap_or_default()
                    );
                }

                // Swap the whole series; the previous one is dropped here
                let stamp = RefreshTimestamp::new(self.clock.now());
                self.state.series = Arc::new(series);
                self.state.last_updated = Some(stamp);
                self.state.last_failure = None;

                Some(DataUpdate {
                    rows: to_table_rows(&self.state.series),
                    last_updated: stamp.display_text(),
                })
            }
            Err(e) => {
                let kind = e.kind();
                log::warn!(
                    "Refresh #{} for {} failed ({}): {}; keeping data from {}",
                    tick,
                    ticker,
                    kind,
                    e,
                    self.state
                        .last_updated
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "never".to_string())
                );
                self.state.last_failure = Some(kind);
                None
            }
        }
    }

    fn select_field(&mut self, field: SelectedField) -> ChartSpec {
        log::debug!("Selected field: {} -> {}", self.state.field, field);
        self.state.field = field;
        self.current_chart()
    }

    fn current_chart(&self) -> ChartSpec {
        to_chart(&self.state.series, &self.state.ticker, self.state.field)
    }

    fn current_rows(&self) -> Vec<TableRow> {
        to_table_rows(&self.state.series)
    }

    fn state(&self) -> &DashboardState {
        &self.state
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::errors::{FetchError, FetchResult};
    use crate::domain::model::PriceRecord;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Repository replaying scripted results, then reporting transport errors.
    pub(crate) struct ScriptedRepository {
        responses: Mutex<VecDeque<FetchResult<PriceSeries>>>,
    }

    impl ScriptedRepository {
        pub(crate) fn new(responses: Vec<FetchResult<PriceSeries>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl PriceHistoryRepository for ScriptedRepository {
        async fn fetch_history(&self, _ticker: &TickerSymbol) -> FetchResult<PriceSeries> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".into())))
        }
    }

    /// Clock advancing one minute per reading.
    pub(crate) struct StepClock {
        next: Mutex<NaiveDateTime>,
    }

    impl StepClock {
        pub(crate) fn new() -> Self {
            Self {
                next: Mutex::new(
                    NaiveDate::from_ymd_opt(2024, 1, 3)
                        .unwrap()
                        .and_hms_opt(16, 0, 0)
                        .unwrap(),
                ),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> NaiveDateTime {
            let mut next = self.next.lock().unwrap();
            let now = *next;
            *next = now + chrono::Duration::minutes(1);
            now
        }
    }

    pub(crate) fn two_day_series() -> PriceSeries {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        PriceSeries::from_records(vec![
            PriceRecord::new(day(2), dec!(180), dec!(182), dec!(179), dec!(181), 1_000),
            PriceRecord::new(day(3), dec!(181), dec!(183), dec!(180), dec!(182), 2_000),
        ])
    }

    fn service(responses: Vec<FetchResult<PriceSeries>>) -> DashboardServiceImpl {
        DashboardServiceImpl::new(
            TickerSymbol::new("AAPL").unwrap(),
            Arc::new(ScriptedRepository::new(responses)),
            Box::new(StepClock::new()),
        )
    }

    #[tokio::test]
    async fn test_successful_refresh_publishes_rows_and_timestamp() {
        let mut service = service(vec![Ok(two_day_series())]);

        let update = service.refresh(0).await.expect("refresh should succeed");

        assert_eq!(update.rows.len(), 2);
        assert_eq!(update.last_updated, "Last updated: 2024-01-03 16:00:00");
        assert_eq!(service.state().series().len(), 2);
        assert!(service.state().last_updated().is_some());
        assert_eq!(service.state().last_failure(), None);
    }

    #[tokio::test]
    async fn test_empty_series_is_published_and_advances_timestamp() {
        let mut service = service(vec![Ok(two_day_series()), Ok(PriceSeries::empty())]);

        service.refresh(0).await.unwrap();
        let first_stamp = service.state().last_updated().unwrap();

        let update = service.refresh(1).await.expect("empty result is a success");

        assert!(update.rows.is_empty());
        assert!(service.state().series().is_empty());
        assert!(service.state().last_updated().unwrap() > first_stamp);
        assert_eq!(update.last_updated, "Last updated: 2024-01-03 16:01:00");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_state() {
        let mut service = service(vec![
            Ok(two_day_series()),
            Err(FetchError::Transport("connection refused".into())),
        ]);

        service.refresh(0).await.unwrap();
        let series_before = service.state().series();
        let stamp_before = service.state().last_updated();

        assert!(service.refresh(1).await.is_none());

        assert!(Arc::ptr_eq(&series_before, &service.state().series()));
        assert_eq!(service.state().last_updated(), stamp_before);
        assert_eq!(service.state().last_failure(), Some(FetchFailureKind::Transport));
    }

    #[tokio::test]
    async fn test_failure_before_first_success_leaves_state_empty() {
        let mut service = service(vec![Err(FetchError::Malformed("bad body".into()))]);

        assert!(service.refresh(0).await.is_none());
        assert!(service.state().series().is_empty());
        assert_eq!(service.state().last_updated(), None);
        assert_eq!(service.state().last_failure(), Some(FetchFailureKind::Malformed));
    }

    #[tokio::test]
    async fn test_success_clears_last_failure() {
        let mut service = service(vec![
            Err(FetchError::Provider {
                status: 500,
                message: "internal".into(),
            }),
            Ok(two_day_series()),
        ]);

        service.refresh(0).await;
        assert_eq!(service.state().last_failure(), Some(FetchFailureKind::Provider));

        service.refresh(1).await.unwrap();
        assert_eq!(service.state().last_failure(), None);
    }

    #[tokio::test]
    async fn test_select_field_does_not_touch_series() {
        let mut service = service(vec![Ok(two_day_series())]);
        service.refresh(0).await.unwrap();
        let rows_before = service.current_rows();

        let chart = service.select_field(SelectedField::Open);

        assert_eq!(service.state().field(), SelectedField::Open);
        assert_eq!(chart.y_values(), vec![dec!(180), dec!(181)]);
        assert_eq!(chart.title, "AAPL - Open Price");
        assert_eq!(service.current_rows(), rows_before);
    }

    #[tokio::test]
    async fn test_refresh_does_not_touch_selected_field() {
        let mut service = service(vec![Ok(two_day_series()), Ok(two_day_series())]);
        service.refresh(0).await.unwrap();
        service.select_field(SelectedField::Low);

        service.refresh(1).await.unwrap();

        assert_eq!(service.state().field(), SelectedField::Low);
    }
}
