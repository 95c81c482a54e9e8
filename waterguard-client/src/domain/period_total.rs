use time::Date;

/// Summed usage over one calendar bucket, keyed by the bucket's first day.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PeriodTotal {
    pub period_start: Date,
    pub usage_liters: f64,
}

pub type DailyTotal = PeriodTotal;
pub type MonthlyTotal = PeriodTotal;
