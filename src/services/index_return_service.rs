use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use crate::models::IndexReturnQuote;
use crate::utils::round_to;

/// Calendar days searched backwards from the start date for a close.
pub const START_LOOKBACK_DAYS: i64 = 10;
/// Calendar days of recent data used to find the latest close.
pub const RECENT_WINDOW_DAYS: u32 = 5;

pub fn parse_start_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("start_date must be YYYY-MM-DD, got '{}'", raw)))
}

/// `NotFound` from a provider means "no rows"; any other failure is a fetch error.
fn rows_or_empty(
    result: Result<Vec<ExternalPricePoint>, PriceProviderError>,
) -> Result<Vec<ExternalPricePoint>, AppError> {
    match result {
        Ok(points) => Ok(points),
        Err(PriceProviderError::NotFound) => Ok(Vec::new()),
        Err(e) => Err(AppError::from(e)),
    }
}

/// Point-to-point return of `ticker` from `start_date` to the latest close.
///
/// The start price is the last close in `[start_date - 10d, start_date]`, so weekends and
/// holidays resolve to the previous trading day. The end price is the last close in the most
/// recent 5 days the provider has. No retries and no caching.
pub async fn fetch_index_return(
    provider: &dyn PriceProvider,
    ticker: &str,
    start_date: NaiveDate,
) -> Result<IndexReturnQuote, AppError> {
    let (search_start, search_end) = start_date
        .checked_sub_signed(Duration::days(START_LOOKBACK_DAYS))
        .zip(start_date.checked_add_signed(Duration::days(1)))
        .ok_or_else(|| AppError::Validation(format!("start_date {} is out of range", start_date)))?;

    let start_rows = rows_or_empty(provider.fetch_history(ticker, search_start, search_end).await)?;
    let Some(start) = start_rows.last() else {
        warn!("No market data for {} between {} and {}", ticker, search_start, start_date);
        return Err(AppError::NotFound(
            "No market data available for the start date".to_string(),
        ));
    };

    if !(start.close.is_finite() && start.close > 0.0) {
        return Err(AppError::Provider(format!(
            "invalid close {} for {} on {}",
            start.close, ticker, start.date
        )));
    }

    let recent_rows = rows_or_empty(provider.fetch_recent_history(ticker, RECENT_WINDOW_DAYS).await)?;
    let Some(end) = recent_rows.last() else {
        warn!("No recent market data for {}", ticker);
        return Err(AppError::NotFound("No recent market data available".to_string()));
    };

    let index_return = (end.close - start.close) / start.close * 100.0;

    info!(
        "{} {} ({:.2}) -> {} ({:.2}): {:.4}%",
        ticker, start.date, start.close, end.date, end.close, index_return
    );

    Ok(IndexReturnQuote {
        ticker: ticker.to_string(),
        start_date: start.date,
        start_price: round_to(start.close, 2),
        end_date: end.date,
        end_price: round_to(end.close, 2),
        index_return: round_to(index_return, 4),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fixture::FixtureProvider;
    use async_trait::async_trait;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn p(date: NaiveDate, close: f64) -> ExternalPricePoint {
        ExternalPricePoint { date, close }
    }

    fn gspc() -> FixtureProvider {
        FixtureProvider::new().with_series(
            "^GSPC",
            vec![
                p(d(2023, 1, 11), 3969.61),
                p(d(2023, 1, 12), 3983.17),
                p(d(2023, 1, 13), 3999.09),
                p(d(2023, 1, 17), 3990.97),
                p(d(2024, 1, 10), 4783.45),
                p(d(2024, 1, 11), 4780.24),
                p(d(2024, 1, 12), 4783.83),
            ],
        )
    }

    struct FailingProvider;

    #[async_trait]
    impl PriceProvider for FailingProvider {
        async fn fetch_history(
            &self,
            _ticker: &str,
            _start: NaiveDate,
            _end_exclusive: NaiveDate,
        ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            Err(PriceProviderError::Network("connection reset".into()))
        }

        async fn fetch_recent_history(
            &self,
            _ticker: &str,
            _days: u32,
        ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            Err(PriceProviderError::Network("connection reset".into()))
        }
    }

    /// Has start-window rows but nothing in the recent window.
    struct StaleProvider {
        recent_not_found: bool,
    }

    #[async_trait]
    impl PriceProvider for StaleProvider {
        async fn fetch_history(
            &self,
            _ticker: &str,
            _start: NaiveDate,
            _end_exclusive: NaiveDate,
        ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            Ok(vec![p(d(2023, 1, 13), 3999.09)])
        }

        async fn fetch_recent_history(
            &self,
            _ticker: &str,
            _days: u32,
        ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
            if self.recent_not_found {
                Err(PriceProviderError::NotFound)
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[tokio::test]
    async fn test_weekend_start_date_resolves_to_prior_trading_day() {
        // 2023-01-15 is a Sunday
        let quote = fetch_index_return(&gspc(), "^GSPC", d(2023, 1, 15)).await.unwrap();

        assert_eq!(quote.start_date, d(2023, 1, 13));
        assert_eq!(quote.start_price, 3999.09);
        assert_eq!(quote.end_date, d(2024, 1, 12));
        assert_eq!(quote.end_price, 4783.83);
        let expected = round_to((4783.83 - 3999.09) / 3999.09 * 100.0, 4);
        assert_eq!(quote.index_return, expected);
    }

    #[tokio::test]
    async fn test_start_date_on_trading_day_uses_that_close() {
        let quote = fetch_index_return(&gspc(), "^GSPC", d(2023, 1, 12)).await.unwrap();
        assert_eq!(quote.start_date, d(2023, 1, 12));
        assert_eq!(quote.start_price, 3983.17);
    }

    #[tokio::test]
    async fn test_no_rows_in_lookback_window_is_not_found() {
        let err = fetch_index_return(&gspc(), "^GSPC", d(2022, 6, 1)).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert!(msg.contains("start date")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_not_found() {
        let err = fetch_index_return(&gspc(), "ZZZZ", d(2023, 1, 13)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_is_surfaced() {
        let err = fetch_index_return(&FailingProvider, "^GSPC", d(2023, 1, 13)).await.unwrap_err();
        match err {
            AppError::Provider(msg) => assert!(msg.contains("connection reset")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_recent_window_is_not_found() {
        let provider = StaleProvider { recent_not_found: false };
        let err = fetch_index_return(&provider, "^GSPC", d(2023, 1, 13)).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "No recent market data available"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recent_not_found_is_not_found() {
        let provider = StaleProvider { recent_not_found: true };
        let err = fetch_index_return(&provider, "^GSPC", d(2023, 1, 13)).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert!(msg.contains("recent")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_date_at_calendar_limits_is_rejected() {
        for date in [NaiveDate::MIN, NaiveDate::MAX] {
            let err = fetch_index_return(&gspc(), "^GSPC", date).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{} gave {:?}", date, err);
        }
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(parse_start_date("2023-01-15").unwrap(), d(2023, 1, 15));
        assert!(matches!(parse_start_date("01/15/2023"), Err(AppError::Validation(_))));
    }
}
