// src/main.rs
use stock_dashboard::adapter::console;
use stock_dashboard::adapter::DashboardCoordinator;
use stock_dashboard::application::dto::{UiEvent, ViewUpdate};
use stock_dashboard::application::service::DashboardServiceImpl;
use stock_dashboard::config::Config;
use stock_dashboard::domain::errors::AppResult;
use stock_dashboard::domain::model::SelectedField;
use stock_dashboard::domain::service::SystemClock;
use stock_dashboard::infrastructure::YahooChartRepository;

use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::sync::mpsc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting stock_dashboard v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Tracking {} over {} of daily history, refreshing every {}s",
        config.dashboard.ticker,
        config.provider.history_range,
        config.dashboard.refresh_interval().as_secs()
    );

    // Create provider repository
    let repository = Arc::new(YahooChartRepository::from_config(&config.provider)?);

    let service = DashboardServiceImpl::new(
        config.dashboard.ticker.clone(),
        repository,
        Box::new(SystemClock),
    );

    // Create channels
    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(16);
    let (view_tx, view_rx) = mpsc::channel::<ViewUpdate>(64);

    let coordinator = DashboardCoordinator::new(
        Box::new(service),
        config.dashboard.refresh_interval(),
        ui_rx,
        view_tx,
    );

    let renderer = tokio::spawn(console::print_updates(view_rx));

    // Keeps the UI channel open after stdin ends; the dashboard runs until Ctrl+C
    let _ui_guard = ui_tx.clone();

    std::thread::spawn(move || {
        if let Err(e) = console::read_ui_events(std::io::stdin().lock(), &ui_tx) {
            log::error!("Console input stopped: {}", e);
        }
    });

    let fields: Vec<&str> = SelectedField::ALL.iter().map(|f| f.as_str()).collect();
    log::info!("Type one of {} to change the chart. Press Ctrl+C to stop.", fields.join(", "));

    tokio::select! {
        result = coordinator.run() => result?,
        _ = ctrl_c() => log::info!("Shutting down..."),
    }

    if let Err(e) = renderer.await {
        log::error!("Renderer task failed: {}", e);
    }

    log::info!("Shutdown complete. Goodbye!");
    Ok(())
}
