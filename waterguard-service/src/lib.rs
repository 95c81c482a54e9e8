pub mod anomaly;
pub mod config;
pub mod dashboard_server;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod sources;
pub mod transform;

pub use pipeline::{render_dashboard, DashboardReport, Pipeline, PipelineError};
