use time::macros::datetime;
use waterguard_client::domain::UsageRecord;

use crate::pipeline::{PipelineError, Transform};

/// Pure validation of a `UsageRecord`.
///
/// Rules:
/// - usage_liters must be finite and non-negative.
/// - timestamp must be within a broad sanity window [2000-01-01, 2100-01-01).
pub fn validate_usage_record(record: UsageRecord) -> Result<UsageRecord, PipelineError> {
    if !record.usage_liters.is_finite() || record.usage_liters < 0.0 {
        return Err(PipelineError::InvalidInput(format!(
            "usage_liters must be a non-negative number, got {} at {}",
            record.usage_liters, record.timestamp
        )));
    }

    let min_ts = datetime!(2000-01-01 00:00:00);
    let max_ts = datetime!(2100-01-01 00:00:00);

    if record.timestamp < min_ts || record.timestamp >= max_ts {
        return Err(PipelineError::InvalidInput(format!(
            "timestamp {} out of allowed range",
            record.timestamp
        )));
    }

    Ok(record)
}

#[derive(Clone, Default)]
pub struct UsageValidation;

impl Transform for UsageValidation {
    fn apply(&self, input: UsageRecord) -> Result<UsageRecord, PipelineError> {
        match validate_usage_record(input) {
            Ok(r) => Ok(r),
            Err(e) => {
                metrics::counter!("validation_usage_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}
