use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;

use eiatrack::app;
use eiatrack::config::{AppConfig, ProviderKind};
use eiatrack::external::fixture::FixtureProvider;
use eiatrack::external::price_provider::PriceProvider;
use eiatrack::external::yahoofinance::YahooFinanceProvider;
use eiatrack::logging::{init_logging, LoggingConfig};
use eiatrack::services::catalog_service::ProductCatalog;
use eiatrack::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;

    let provider: Arc<dyn PriceProvider> = match config.provider {
        ProviderKind::Yahoo => {
            tracing::info!("Using price provider: Yahoo Finance (timeout {:?})", config.provider_timeout);
            Arc::new(
                YahooFinanceProvider::new(config.provider_timeout)
                    .context("failed to create Yahoo Finance client")?,
            )
        }
        ProviderKind::Fixture => {
            tracing::info!("Using price provider: fixtures in {}", config.fixture_dir.display());
            Arc::new(
                FixtureProvider::from_dir(&config.fixture_dir)
                    .context("failed to load price fixtures")?,
            )
        }
    };

    let catalog = match &config.catalog_path {
        Some(path) => ProductCatalog::from_json_file(path)?,
        None => ProductCatalog::builtin(),
    };
    tracing::info!("Product catalog ready with {} products", catalog.all().len());

    let state = AppState {
        price_provider: provider,
        catalog: Arc::new(catalog),
        branding: Arc::new(config.branding.clone()),
    };
    let app = app::create_app(state);

    let addr = config.bind_addr().map_err(anyhow::Error::msg)?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("EIA Track backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
