pub mod report;

pub use report::DashboardReport;

use std::sync::Arc;

use time::{macros::format_description, Date};
use waterguard_client::{
    domain::{LabeledUsageSeries, UsageRecord, UsageSeries},
    query::{self, QueryError},
};

use crate::{
    anomaly::{self, AnomalyLabeler},
    sources::{DataSource, UsageCsvSource},
    transform,
};

/// Seed for the simulated scenario and the anomaly model.
pub const DEFAULT_SEED: u64 = 42;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("model fit error: {0}")]
    ModelFit(String),
    #[error("invalid selection: {0} is not a day in the usage series")]
    InvalidSelection(Date),
}

impl From<QueryError> for PipelineError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::InvalidSelection(day) => PipelineError::InvalidSelection(day),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Uploaded,
    Simulated,
}

pub trait Source {
    fn load(&self) -> Result<UsageSeries, PipelineError>;

    fn origin(&self) -> DataOrigin;
}

pub trait Transform: Send + Sync {
    fn apply(&self, input: UsageRecord) -> Result<UsageRecord, PipelineError>;
}

/// One full dashboard render: resolve, validate, label, aggregate.
///
/// A pipeline is built per interaction and consumed by `run`; nothing is
/// carried between renders.
pub struct Pipeline<S> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform>>, // applied in order to every record
    pub labeler: AnomalyLabeler,
}

impl<S: Source> Pipeline<S> {
    /// Loads the series and runs every record through the transforms.
    pub fn resolve(&self) -> Result<UsageSeries, PipelineError> {
        let series = self.source.load()?;
        let mut records = Vec::with_capacity(series.len());
        for record in series.records() {
            let mut r = *record;
            for t in &self.transforms {
                r = t.apply(r)?;
            }
            records.push(r);
        }
        Ok(UsageSeries::from_records(records))
    }

    pub fn run(self, selected_day: Option<Date>) -> Result<DashboardReport, PipelineError> {
        let series = self.resolve()?;
        let labeled = self.labeler.label(&series)?;
        build_report(self.source.origin(), &labeled, selected_day)
    }
}

impl Pipeline<DataSource> {
    /// Default pipeline over an optional upload.
    pub fn for_upload(upload: Option<UsageCsvSource>, seed: u64) -> Self {
        Self {
            source: DataSource::resolve(upload, seed),
            transforms: vec![Arc::new(transform::UsageValidation)],
            labeler: AnomalyLabeler::new(seed),
        }
    }
}

/// Parses a `YYYY-MM-DD` day selection.
pub fn parse_day(s: &str) -> Result<Date, PipelineError> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| PipelineError::InvalidInput(format!("invalid day '{s}': {e}")))
}

/// `f(raw_input, selected_day)` with the default seed.
pub fn render_dashboard(
    upload: Option<Vec<u8>>,
    selected_day: Option<Date>,
) -> Result<DashboardReport, PipelineError> {
    let result = Pipeline::for_upload(upload.map(UsageCsvSource::from_bytes), DEFAULT_SEED)
        .run(selected_day);

    match &result {
        Ok(_) => metrics::counter!("dashboard_renders_total").increment(1),
        Err(e) => {
            tracing::warn!(error = %e, "dashboard render failed");
            metrics::counter!("dashboard_render_errors_total").increment(1);
        }
    }
    result
}

/// Derives every view of the dashboard from a labeled series.
///
/// With no selection the first available day is shown.
pub fn build_report(
    origin: DataOrigin,
    labeled: &LabeledUsageSeries,
    selected_day: Option<Date>,
) -> Result<DashboardReport, PipelineError> {
    let selectable_days = query::selectable_days(labeled);
    let day = match selected_day.or_else(|| selectable_days.first().copied()) {
        Some(day) => day,
        None => {
            return Err(PipelineError::ModelFit(
                "labeled series has no days to display".to_string(),
            ))
        }
    };

    let hourly = query::hourly_view(labeled, day)?;

    Ok(DashboardReport {
        origin,
        record_count: labeled.len(),
        anomaly_count: labeled.anomaly_count(),
        expected_anomaly_count: anomaly::expected_anomalies(labeled.len()),
        anomalies: query::anomaly_table(labeled),
        selectable_days,
        selected_day: day,
        hourly,
        daily: query::daily_totals(labeled),
        monthly: query::monthly_totals(labeled),
    })
}
