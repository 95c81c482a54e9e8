use time::macros::date;
use waterguard_client::query;
use waterguard_service::{
    anomaly::{expected_anomalies, AnomalyLabeler},
    pipeline::{render_dashboard, DataOrigin, Pipeline, PipelineError, DEFAULT_SEED},
    sources::{simulated::SIMULATED_HOURS, Simulator, UsageCsvSource},
};

fn simulated_pipeline() -> Pipeline<waterguard_service::sources::DataSource> {
    Pipeline::for_upload(None, DEFAULT_SEED)
}

#[test]
fn labeling_keeps_length_and_timestamp_order() {
    let series = simulated_pipeline().resolve().expect("resolve");
    let labeled = AnomalyLabeler::new(DEFAULT_SEED).label(&series).expect("label");

    assert_eq!(labeled.len(), series.len());
    for (l, r) in labeled.records().iter().zip(series.records()) {
        assert_eq!(l.timestamp, r.timestamp);
        assert_eq!(l.usage_liters, r.usage_liters);
    }
}

#[test]
fn anomaly_count_is_near_the_contamination_rate() {
    let report = render_dashboard(None, None).expect("render");
    let expected = expected_anomalies(SIMULATED_HOURS);

    assert_eq!(report.expected_anomaly_count, expected);
    assert!(report.anomaly_count <= report.record_count);
    assert!(
        report.anomaly_count * 2 >= expected && report.anomaly_count <= expected * 2,
        "anomaly_count {} outside band around {expected}",
        report.anomaly_count
    );
    assert_eq!(report.anomalies.len(), report.anomaly_count);
}

#[test]
fn largest_spike_is_flagged() {
    let report = render_dashboard(None, None).expect("render");
    let series = Simulator::new(DEFAULT_SEED).generate().expect("simulate").series;
    let peak = series
        .records()
        .iter()
        .max_by(|a, b| a.usage_liters.total_cmp(&b.usage_liters))
        .copied()
        .expect("non-empty");

    assert!(report.anomalies.contains(&peak));
}

#[test]
fn daily_and_monthly_totals_conserve_usage() {
    let report = render_dashboard(None, None).expect("render");
    let series = Simulator::new(DEFAULT_SEED).generate().expect("simulate").series;
    let total = series.total_liters();

    let daily: f64 = report.daily.iter().map(|t| t.usage_liters).sum();
    let monthly: f64 = report.monthly.iter().map(|t| t.usage_liters).sum();

    assert_eq!(report.daily.len(), 90);
    assert_eq!(
        report.monthly.iter().map(|t| t.period_start).collect::<Vec<_>>(),
        vec![date!(2025-05-01), date!(2025-06-01), date!(2025-07-01)]
    );
    assert!((daily - total).abs() < 1e-6 * total);
    assert!((monthly - total).abs() < 1e-6 * total);
}

#[test]
fn selecting_the_same_day_twice_is_idempotent() {
    let day = Some(date!(2025-06-10));
    let first = render_dashboard(None, day).expect("render");
    let second = render_dashboard(None, day).expect("render");

    assert_eq!(first.hourly, second.hourly);
    assert_eq!(first, second);
    assert!(first.hourly.records.iter().all(|r| r.day() == date!(2025-06-10)));
    assert!(first.hourly.anomalies.iter().all(|r| r.anomaly.is_anomaly()));
}

#[test]
fn hourly_anomalies_match_the_full_series() {
    let labeled = {
        let series = simulated_pipeline().resolve().expect("resolve");
        AnomalyLabeler::new(DEFAULT_SEED).label(&series).expect("label")
    };

    let mut from_days = 0;
    for day in query::selectable_days(&labeled) {
        from_days += query::hourly_view(&labeled, day).expect("day").anomalies.len();
    }
    assert_eq!(from_days, labeled.anomaly_count());
}

#[test]
fn one_constant_day_from_csv() {
    let mut csv = String::from("timestamp,usage_liters\n");
    for hour in 0..24 {
        csv.push_str(&format!("2025-03-09T{hour:02}:00:00,10\n"));
    }

    let report = render_dashboard(Some(csv.into_bytes()), None).expect("render");

    assert_eq!(report.origin, DataOrigin::Uploaded);
    assert_eq!(report.daily.len(), 1);
    assert_eq!(report.daily[0].usage_liters, 240.0);
    assert_eq!(report.anomaly_count, 0);
    assert_eq!(report.selectable_days, vec![date!(2025-03-09)]);
}

#[test]
fn missing_usage_column_stops_before_labeling() {
    let upload = UsageCsvSource::from_bytes("timestamp,reading\n2025-05-01 00:00:00,4\n");
    let pipeline = Pipeline::for_upload(Some(upload), DEFAULT_SEED);

    assert!(matches!(pipeline.resolve(), Err(PipelineError::InvalidInput(_))));
    assert!(matches!(pipeline.run(None), Err(PipelineError::InvalidInput(_))));
}

#[test]
fn report_serializes_for_the_shell() {
    let report = render_dashboard(None, Some(date!(2025-05-02))).expect("render");
    let json = serde_json::to_value(&report).expect("serialize");

    assert_eq!(json["origin"], "simulated");
    assert_eq!(json["selected_day"], "2025-05-02");
    assert_eq!(json["hourly"]["records"].as_array().map(Vec::len), Some(24));
    assert_eq!(json["selectable_days"].as_array().map(Vec::len), Some(90));
    let label = &json["hourly"]["records"][0]["anomaly"];
    assert!(label == "Normal" || label == "Anomaly");
}
