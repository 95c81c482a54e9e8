use anyhow::Result;
use waterguard_service::{
    observability,
    pipeline::{parse_day, Pipeline, DEFAULT_SEED},
    sources::UsageCsvSource,
};
use std::env;

/// Render one dashboard report as JSON on stdout.
///
/// Usage:
///   render_dashboard [<csv_file_path>|simulated] [YYYY-MM-DD]
fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    let upload = match args.get(1).map(String::as_str) {
        None | Some("simulated") => None,
        Some(path) => Some(UsageCsvSource::from_path(path)),
    };
    let day = args.get(2).map(|s| parse_day(s)).transpose()?;

    let report = Pipeline::for_upload(upload, DEFAULT_SEED).run(day)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
