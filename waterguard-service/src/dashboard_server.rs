//! HTTP adapter for the dashboard.
//!
//! Every request re-runs the whole pipeline; the server holds no state
//! between requests.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::pipeline::{self, DashboardReport, PipelineError};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub day: Option<String>,
}

#[derive(Debug)]
pub struct ApiError(PipelineError);

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PipelineError::InvalidSelection(_) => StatusCode::NOT_FOUND,
            PipelineError::ModelFit(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/dashboard", get(simulated_dashboard).post(uploaded_dashboard))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

pub async fn serve(bind_addr: &str, max_upload_bytes: usize) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid http.bind_addr '{bind_addr}': {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dashboard listening");
    axum::serve(listener, router(max_upload_bytes).into_make_service()).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn simulated_dashboard(
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardReport>, ApiError> {
    render(None, params)
}

async fn uploaded_dashboard(
    Query(params): Query<DashboardParams>,
    body: Bytes,
) -> Result<Json<DashboardReport>, ApiError> {
    tracing::info!(bytes = body.len(), "CSV upload received");
    render(Some(body.to_vec()), params)
}

fn render(
    upload: Option<Vec<u8>>,
    params: DashboardParams,
) -> Result<Json<DashboardReport>, ApiError> {
    let day = params.day.as_deref().map(pipeline::parse_day).transpose()?;
    let report = pipeline::render_dashboard(upload, day)?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(day: Option<&str>) -> Query<DashboardParams> {
        Query(DashboardParams {
            day: day.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn simulated_dashboard_renders_selected_day() {
        let Json(report) = simulated_dashboard(params(Some("2025-06-15")))
            .await
            .expect("render");
        assert_eq!(report.selected_day, time::macros::date!(2025-06-15));
        assert_eq!(report.hourly.records.len(), 24);
    }

    #[tokio::test]
    async fn upload_missing_column_is_bad_request() {
        let body = Bytes::from_static(b"timestamp,liters\n2025-05-01 00:00:00,1\n");
        let err = uploaded_dashboard(params(None), body).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_day_is_not_found() {
        let err = simulated_dashboard(params(Some("2030-01-01"))).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_day_is_bad_request() {
        let err = simulated_dashboard(params(Some("June 1st"))).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_upload_is_unprocessable() {
        let body = Bytes::from_static(b"timestamp,usage_liters\n");
        let err = uploaded_dashboard(params(None), body).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }
}
