// src/adapter/coordinator.rs
// Dashboard coordinator: one task owning all state, fed by a timer and the UI

use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::application::dto::{UiEvent, ViewUpdate};
use crate::application::service::DashboardService;
use crate::domain::errors::{AppError, AppResult};

pub struct DashboardCoordinator {
    service: Box<dyn DashboardService + Send + Sync>,
    refresh_interval: Duration,
    ui_receiver: mpsc::Receiver<UiEvent>,
    view_sender: mpsc::Sender<ViewUpdate>,
}

impl DashboardCoordinator {
    pub fn new(
        service: Box<dyn DashboardService + Send + Sync>,
        refresh_interval: Duration,
        ui_receiver: mpsc::Receiver<UiEvent>,
        view_sender: mpsc::Sender<ViewUpdate>,
    ) -> Self {
        Self {
            service,
            refresh_interval,
            ui_receiver,
            view_sender,
        }
    }

    /// Run until the UI channel closes.
    ///
    /// Events are handled one at a time: a slow fetch holds back UI events,
    /// and timer ticks missed meanwhile are skipped rather than queued.
    pub async fn run(mut self) -> AppResult<()> {
        log::info!(
            "Dashboard coordinator started for {} (refresh every {:?})",
            self.service.state().ticker(),
            self.refresh_interval
        );

        // Initial load, then the chart for the dropdown's initial value
        self.publish_refresh(0).await?;
        let chart = self.service.current_chart();
        self.emit(ViewUpdate::Chart(chart)).await?;

        let mut timer = interval_at(Instant::now() + self.refresh_interval, self.refresh_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick: u64 = 0;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    tick += 1;
                    self.publish_refresh(tick).await?;
                }
                event = self.ui_receiver.recv() => match event {
                    Some(event) => self.handle_ui_event(event).await?,
                    None => {
                        log::info!("UI channel closed");
                        break;
                    }
                }
            }
        }

        log::info!("Dashboard coordinator stopped after {} scheduled refreshes", tick);
        Ok(())
    }

    /// Refresh the data; only the grid and timestamp are re-emitted.
    async fn publish_refresh(&mut self, tick: u64) -> AppResult<()> {
        if let Some(update) = self.service.refresh(tick).await {
            self.emit(ViewUpdate::Table(update.rows)).await?;
            self.emit(ViewUpdate::LastUpdated(update.last_updated)).await?;
        }
        Ok(())
    }

    async fn handle_ui_event(&mut self, event: UiEvent) -> AppResult<()> {
        match event {
            UiEvent::FieldSelected(field) => {
                let chart = self.service.select_field(field);
                self.emit(ViewUpdate::Chart(chart)).await
            }
        }
    }

    async fn emit(&self, update: ViewUpdate) -> AppResult<()> {
        self.view_sender
            .send(update)
            .await
            .map_err(|e| AppError::Channel(format!("View channel closed: {}", e)))
    }
}
