// Public fallible APIs in this crate share one concrete error contract (`SonarError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub(crate) mod auth;
pub mod client;
pub mod config;
pub mod copy_text;
pub mod detect;
pub mod enrich;
pub mod error;
pub mod measures;
pub mod models;
pub mod report;
pub(crate) mod text;
pub mod throttle;

pub use client::{MetricsApi, MetricsClient};
pub use config::ClientConfig;
pub use copy_text::Granularity;
pub use error::{Result, SonarError};
pub use report::{AnalysisRun, Analyzer, RunToken};
