pub mod isolation_forest;

pub use isolation_forest::IsolationForest;

use thiserror::Error;
use waterguard_client::domain::{AnomalyLabel, LabeledUsageSeries, UsageSeries};

use crate::pipeline::PipelineError;

/// Expected share of outliers in a usage series.
pub const CONTAMINATION: f64 = 0.02;

/// Below this many points the decision boundary is unstable.
pub const MIN_STABLE_POINTS: usize = 20;

#[derive(Debug, Error)]
pub enum AnomalyError {
    #[error("insufficient data: required {required}, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    #[error("invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("model not fitted: call fit() before predict()")]
    NotFitted,
}

impl From<AnomalyError> for PipelineError {
    fn from(e: AnomalyError) -> Self {
        PipelineError::ModelFit(e.to_string())
    }
}

/// Unsupervised one-feature outlier model.
pub trait OutlierModel {
    fn fit(&mut self, data: &[f64]) -> Result<(), AnomalyError>;

    fn score_samples(&self, data: &[f64]) -> Result<Vec<f64>, AnomalyError>;

    fn predict(&self, data: &[f64]) -> Result<Vec<AnomalyLabel>, AnomalyError>;

    fn is_fitted(&self) -> bool;
}

/// Fits a fresh model on a series and labels every record of it.
#[derive(Debug, Clone, Copy)]
pub struct AnomalyLabeler {
    seed: u64,
}

impl AnomalyLabeler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn label(&self, series: &UsageSeries) -> Result<LabeledUsageSeries, PipelineError> {
        let values = series.usage_values();
        if values.len() < MIN_STABLE_POINTS {
            tracing::warn!(
                points = values.len(),
                min_stable = MIN_STABLE_POINTS,
                "short series, anomaly boundary may be unstable"
            );
        }

        let mut model = IsolationForest::new(CONTAMINATION, self.seed);
        model.fit(&values)?;
        let labels = model.predict(&values)?;

        let labeled = LabeledUsageSeries::from_labels(series.records(), &labels).ok_or_else(|| {
            PipelineError::ModelFit(format!(
                "model returned {} labels for {} records",
                labels.len(),
                series.len()
            ))
        })?;

        let expected = expected_anomalies(series.len());
        let count = labeled.anomaly_count();
        if !within_tolerance(count, expected) {
            tracing::warn!(
                anomalies = count,
                expected,
                contamination = CONTAMINATION,
                "realized anomaly rate outside tolerance band"
            );
        }
        metrics::counter!("anomalies_detected_total").increment(count as u64);
        tracing::info!(records = series.len(), anomalies = count, "usage series labeled");

        Ok(labeled)
    }
}

/// `round(contamination * n)`.
pub fn expected_anomalies(n: usize) -> usize {
    (CONTAMINATION * n as f64).round() as usize
}

/// The band is `[expected / 2, expected * 2]`; it is only reported on.
fn within_tolerance(count: usize, expected: usize) -> bool {
    count * 2 >= expected && count <= expected * 2
}
