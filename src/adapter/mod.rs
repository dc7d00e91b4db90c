// src/adapter/mod.rs
pub mod console;
pub mod coordinator;

pub use coordinator::DashboardCoordinator;
