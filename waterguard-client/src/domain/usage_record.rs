use time::{Date, PrimitiveDateTime};

/// One hourly water meter reading.
///
/// `timestamp` is wall-clock time in the series' own locale; calendar
/// bucketing never converts it to another zone.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UsageRecord {
    pub timestamp: PrimitiveDateTime,
    pub usage_liters: f64,
}

impl UsageRecord {
    pub fn new(timestamp: PrimitiveDateTime, usage_liters: f64) -> Self {
        Self {
            timestamp,
            usage_liters,
        }
    }

    pub fn day(&self) -> Date {
        self.timestamp.date()
    }
}

/// Timestamp-ordered sequence of usage records.
///
/// Duplicate timestamps are allowed and keep their input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSeries {
    records: Vec<UsageRecord>,
}

impl UsageSeries {
    /// Builds a series, stably sorting the records by timestamp.
    pub fn from_records(mut records: Vec<UsageRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self { records }
    }

    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The single model feature, in series order.
    pub fn usage_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.usage_liters).collect()
    }

    pub fn total_liters(&self) -> f64 {
        self.records.iter().map(|r| r.usage_liters).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn from_records_sorts_and_keeps_duplicates_stable() {
        let series = UsageSeries::from_records(vec![
            UsageRecord::new(datetime!(2025-05-01 02:00), 3.0),
            UsageRecord::new(datetime!(2025-05-01 00:00), 1.0),
            UsageRecord::new(datetime!(2025-05-01 02:00), 4.0),
        ]);

        let values = series.usage_values();
        assert_eq!(values, vec![1.0, 3.0, 4.0]);
        assert_eq!(series.total_liters(), 8.0);
    }

    #[test]
    fn day_is_the_wall_clock_date() {
        let r = UsageRecord::new(datetime!(2025-05-31 23:00), 1.0);
        assert_eq!(r.day(), time::macros::date!(2025-05-31));
    }
}
