pub mod domain;
pub mod query;

pub use domain::{
    AnomalyLabel, DailyTotal, HourlyView, LabeledUsageRecord, LabeledUsageSeries, MonthlyTotal,
    PeriodTotal, UsageRecord, UsageSeries,
};
pub use query::QueryError;
