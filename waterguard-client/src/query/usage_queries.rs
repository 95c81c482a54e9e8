use std::collections::BTreeMap;

use time::{Date, Duration};

use crate::domain::{
    DailyTotal, HourlyView, LabeledUsageRecord, LabeledUsageSeries, MonthlyTotal, PeriodTotal,
    UsageRecord,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("day {0} is not present in the usage series")]
    InvalidSelection(Date),
}

/// Distinct calendar days present in the series, ascending.
pub fn selectable_days(series: &LabeledUsageSeries) -> Vec<Date> {
    let mut days: Vec<Date> = series.records().iter().map(LabeledUsageRecord::day).collect();
    days.sort();
    days.dedup();
    days
}

/// Time-ordered records of a single day, plus the anomalies among them.
pub fn hourly_view(series: &LabeledUsageSeries, day: Date) -> Result<HourlyView, QueryError> {
    let records: Vec<LabeledUsageRecord> = series
        .records()
        .iter()
        .filter(|r| r.day() == day)
        .copied()
        .collect();

    if records.is_empty() {
        return Err(QueryError::InvalidSelection(day));
    }

    let anomalies = records
        .iter()
        .filter(|r| r.anomaly.is_anomaly())
        .copied()
        .collect();

    Ok(HourlyView {
        day,
        records,
        anomalies,
    })
}

/// Usage summed per calendar day. Only days with data appear.
pub fn daily_totals(series: &LabeledUsageSeries) -> Vec<DailyTotal> {
    sum_by(series, LabeledUsageRecord::day)
}

/// Usage summed per calendar month, keyed by the first of the month.
pub fn monthly_totals(series: &LabeledUsageSeries) -> Vec<MonthlyTotal> {
    sum_by(series, |r| month_start(r.day()))
}

/// The `Anomaly`-labeled records, for the anomaly details table.
pub fn anomaly_table(series: &LabeledUsageSeries) -> Vec<UsageRecord> {
    series
        .records()
        .iter()
        .filter(|r| r.anomaly.is_anomaly())
        .map(LabeledUsageRecord::record)
        .collect()
}

fn sum_by<F>(series: &LabeledUsageSeries, bucket: F) -> Vec<PeriodTotal>
where
    F: Fn(&LabeledUsageRecord) -> Date,
{
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();
    for r in series.records() {
        *totals.entry(bucket(r)).or_insert(0.0) += r.usage_liters;
    }

    totals
        .into_iter()
        .map(|(period_start, usage_liters)| PeriodTotal {
            period_start,
            usage_liters,
        })
        .collect()
}

fn month_start(day: Date) -> Date {
    day - Duration::days(i64::from(day.day()) - 1)
}
