//! UI layer for the dashboard: app shell, views, and chart painting.

pub mod app;
pub mod chart;

pub use app::{PersistedDashboardSettings, RiskDashboardApp, StartupConfig, SETTINGS_STORAGE_KEY};
