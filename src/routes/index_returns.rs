use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{IndexReturnQuote, IndexReturnRequest};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(fetch_index_return))
}

pub async fn fetch_index_return(
    State(state): State<AppState>,
    payload: Result<Json<IndexReturnRequest>, JsonRejection>,
) -> Result<Json<IndexReturnQuote>, AppError> {
    let Json(req) = payload?;
    let ticker = req.ticker.as_deref().map(str::trim).unwrap_or_default();
    let start_date = req.start_date.as_deref().map(str::trim).unwrap_or_default();
    info!("POST /api/index-return - Fetching {} since {}", ticker, start_date);

    if ticker.is_empty() || start_date.is_empty() {
        warn!("Index return request missing ticker or start_date");
        return Err(AppError::Validation("ticker and start_date required".to_string()));
    }
    let start_date = services::index_return_service::parse_start_date(start_date)?;

    let quote = services::index_return_service::fetch_index_return(
        state.price_provider.as_ref(),
        ticker,
        start_date,
    )
    .await
    .map_err(|e| {
        match &e {
            AppError::NotFound(_) => warn!("No index data for {}: {}", ticker, e),
            _ => error!("Failed to fetch index return for {}: {}", ticker, e),
        }
        e
    })?;
    Ok(Json(quote))
}
