use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{AccountSnapshot, CalculateRequest};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(calculate))
}

pub async fn calculate(
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<AccountSnapshot>, AppError> {
    let Json(req) = payload?;
    info!(
        "POST /api/calculate - Crediting {} allocation(s)",
        req.allocations.len()
    );

    let Some(current_value) = req.current_value.filter(|v| *v > 0.0) else {
        warn!("Rejected calculation with current_value {:?}", req.current_value);
        return Err(AppError::Validation("Current value must be > 0".to_string()));
    };

    let weight_total: f64 = req.allocations.iter().map(|a| a.allocation_pct).sum();
    if (weight_total - 100.0).abs() > 0.01 {
        warn!("Allocation weights sum to {:.2}%, not 100%", weight_total);
    }

    let snapshot = services::crediting_service::calculate_account_value(current_value, &req.allocations);
    info!(
        "Account value {:.2} -> {:.2} ({:+.4}%)",
        snapshot.current_value, snapshot.new_value, snapshot.total_return_pct
    );
    Ok(Json(snapshot))
}
