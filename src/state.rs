use std::sync::Arc;

use crate::external::price_provider::PriceProvider;
use crate::models::ReportBranding;
use crate::services::catalog_service::ProductCatalog;

#[derive(Clone)]
pub struct AppState {
    pub price_provider: Arc<dyn PriceProvider>,
    pub catalog: Arc<ProductCatalog>,
    pub branding: Arc<ReportBranding>,
}
