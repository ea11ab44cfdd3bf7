use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{AnnuityProduct, IndexReturnQuote, StartDateQuery};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/:product_id", get(get_product))
        .route("/:product_id/indexes/:index_id/return", get(get_product_index_return))
}

pub async fn list_products(State(state): State<AppState>) -> Json<Vec<AnnuityProduct>> {
    info!("GET /api/products - Listing product catalog");
    Json(state.catalog.all().to_vec())
}

pub async fn get_product(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AnnuityProduct>, AppError> {
    info!("GET /api/products/{} - Getting product", product_id);
    state
        .catalog
        .get(&product_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            warn!("Unknown product {}", product_id);
            AppError::NotFound(format!("Unknown product '{}'", product_id))
        })
}

pub async fn get_product_index_return(
    Path((product_id, index_id)): Path<(String, String)>,
    Query(query): Query<StartDateQuery>,
    State(state): State<AppState>,
) -> Result<Json<IndexReturnQuote>, AppError> {
    info!(
        "GET /api/products/{}/indexes/{}/return - Fetching index return",
        product_id, index_id
    );
    let ticker = state.catalog.resolve_ticker(&product_id, &index_id)?;
    let raw_date = query
        .start_date
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("start_date required".to_string()))?;
    let start_date = services::index_return_service::parse_start_date(&raw_date)?;

    let quote = services::index_return_service::fetch_index_return(
        state.price_provider.as_ref(),
        &ticker,
        start_date,
    )
    .await
    .map_err(|e| {
        match &e {
            AppError::NotFound(_) => warn!("No index data for {}/{} ({}): {}", product_id, index_id, ticker, e),
            _ => error!("Failed to fetch index return for {}/{}: {}", product_id, index_id, e),
        }
        e
    })?;
    Ok(Json(quote))
}
