pub mod usage_queries;

pub use usage_queries::{
    anomaly_table, daily_totals, hourly_view, monthly_totals, selectable_days, QueryError,
};
