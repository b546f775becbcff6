//! SmartCare Surgery clinic core.
//!
//! The scheduling, pricing, prescription, turnover, and calendar-sync logic
//! behind the clinic's web interface. The presentation layer (routing,
//! sessions, templates, REST serialization) lives elsewhere and calls into
//! these modules; persistence is SQLite via the `db` module.

pub mod calendar;
pub mod config;
pub mod db;
pub mod models;
pub mod prescriptions;
pub mod pricing;
pub mod report;
pub mod scheduling;
pub mod turnover;

use tracing_subscriber::EnvFilter;

/// Initialize tracing from the environment, falling back to the default
/// filter. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} core starting v{}", config::APP_NAME, config::APP_VERSION);
}
