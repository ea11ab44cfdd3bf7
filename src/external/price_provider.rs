use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// A single daily close as returned by a market-data source.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no data found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,
}

/// Source of daily closing prices keyed by ticker.
///
/// Both methods return points in ascending date order. An empty vector means the
/// source has no rows for the request; `NotFound` is treated the same way by callers.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily closes with `start <= date < end_exclusive`.
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError>;

    /// Daily closes for the most recent `days` calendar days of available data.
    async fn fetch_recent_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError>;
}
