pub mod labeled_usage;
pub mod period_total;
pub mod usage_record;

pub use labeled_usage::{AnomalyLabel, HourlyView, LabeledUsageRecord, LabeledUsageSeries};
pub use period_total::{DailyTotal, MonthlyTotal, PeriodTotal};
pub use usage_record::{UsageRecord, UsageSeries};
