use serde::Serialize;
use time::Date;
use waterguard_client::domain::{DailyTotal, HourlyView, MonthlyTotal, UsageRecord};

use super::DataOrigin;

/// Everything the dashboard shows for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub origin: DataOrigin,
    pub record_count: usize,
    pub anomaly_count: usize,
    /// `round(contamination * record_count)`, for comparison only.
    pub expected_anomaly_count: usize,
    pub anomalies: Vec<UsageRecord>,
    pub selectable_days: Vec<Date>,
    pub selected_day: Date,
    pub hourly: HourlyView,
    pub daily: Vec<DailyTotal>,
    pub monthly: Vec<MonthlyTotal>,
}
