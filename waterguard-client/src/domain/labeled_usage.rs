use time::{Date, PrimitiveDateTime};

use super::UsageRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AnomalyLabel {
    Normal,
    Anomaly,
}

impl AnomalyLabel {
    pub fn is_anomaly(self) -> bool {
        matches!(self, AnomalyLabel::Anomaly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LabeledUsageRecord {
    pub timestamp: PrimitiveDateTime,
    pub usage_liters: f64,
    pub anomaly: AnomalyLabel,
}

impl LabeledUsageRecord {
    pub fn new(record: UsageRecord, anomaly: AnomalyLabel) -> Self {
        Self {
            timestamp: record.timestamp,
            usage_liters: record.usage_liters,
            anomaly,
        }
    }

    pub fn day(&self) -> Date {
        self.timestamp.date()
    }

    pub fn record(&self) -> UsageRecord {
        UsageRecord::new(self.timestamp, self.usage_liters)
    }
}

/// Output of the anomaly labeler: one labeled record per input record, in
/// input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledUsageSeries {
    records: Vec<LabeledUsageRecord>,
    anomaly_count: usize,
}

impl LabeledUsageSeries {
    /// Pairs each record with its label. Returns `None` when the lengths differ.
    pub fn from_labels(records: &[UsageRecord], labels: &[AnomalyLabel]) -> Option<Self> {
        if records.len() != labels.len() {
            return None;
        }

        let records: Vec<LabeledUsageRecord> = records
            .iter()
            .zip(labels)
            .map(|(r, l)| LabeledUsageRecord::new(*r, *l))
            .collect();
        let anomaly_count = records.iter().filter(|r| r.anomaly.is_anomaly()).count();

        Some(Self {
            records,
            anomaly_count,
        })
    }

    pub fn records(&self) -> &[LabeledUsageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomaly_count
    }
}

/// Records of one calendar day, for the hourly detail plot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HourlyView {
    pub day: Date,
    pub records: Vec<LabeledUsageRecord>,
    /// The `Anomaly`-labeled subset of `records`.
    pub anomalies: Vec<LabeledUsageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn from_labels_counts_anomalies() {
        let records = vec![
            UsageRecord::new(datetime!(2025-05-01 00:00), 10.0),
            UsageRecord::new(datetime!(2025-05-01 01:00), 90.0),
        ];
        let labeled =
            LabeledUsageSeries::from_labels(&records, &[AnomalyLabel::Normal, AnomalyLabel::Anomaly])
                .expect("same length");

        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled.anomaly_count(), 1);
        assert_eq!(labeled.records()[1].record(), records[1]);
    }

    #[test]
    fn from_labels_rejects_length_mismatch() {
        let records = vec![UsageRecord::new(datetime!(2025-05-01 00:00), 10.0)];
        assert!(LabeledUsageSeries::from_labels(&records, &[]).is_none());
    }
}
