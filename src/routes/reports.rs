use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::ReportRequest;
use crate::services;
use crate::state::AppState;
use crate::utils::filename::report_filename;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(generate_report))
}

pub async fn generate_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let today = chrono::Local::now().date_naive();
    let input = services::report_service::prepare_report(req, today)?;
    info!("POST /api/report - Generating report for {}", input.client_name);

    let filename = report_filename(&state.branding.file_prefix, &input.client_name, today);
    let branding = state.branding.clone();

    // printpdf composition is CPU-bound
    let pdf = tokio::task::spawn_blocking(move || {
        services::report_service::render_report(&input, &branding)
    })
    .await
    .map_err(|e| AppError::Report(format!("report task failed: {}", e)))?
    .map_err(|e| {
        error!("Failed to render report: {}", e);
        e
    })?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| AppError::Report(format!("invalid filename header: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
