// src/infrastructure/mod.rs
pub mod market;

pub use market::YahooChartRepository;
