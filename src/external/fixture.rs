use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Offline provider backed by in-memory series, optionally loaded from `<TICKER>.csv` files.
///
/// Each CSV has a `date,close` header with ISO dates. Used for demos without network
/// access and for tests.
#[derive(Debug, Default, Clone)]
pub struct FixtureProvider {
    series: HashMap<String, Vec<ExternalPricePoint>>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    close: f64,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, ticker: &str, mut points: Vec<ExternalPricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        self.series.insert(ticker.to_string(), points);
        self
    }

    pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut points = Vec::new();
        for row in rdr.deserialize::<CsvRow>() {
            let row = row.map_err(|e| PriceProviderError::Parse(e.to_string()))?;
            points.push(ExternalPricePoint { date: row.date, close: row.close });
        }
        Ok(points)
    }

    pub fn from_dir(dir: &Path) -> Result<Self, PriceProviderError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| PriceProviderError::BadResponse(format!("{}: {}", dir.display(), e)))?;

        let mut provider = Self::new();
        for entry in entries {
            let path = entry
                .map_err(|e| PriceProviderError::BadResponse(e.to_string()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(ticker) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let file = std::fs::File::open(&path)
                .map_err(|e| PriceProviderError::BadResponse(format!("{}: {}", path.display(), e)))?;
            let points = Self::parse_csv(file)?;
            info!("Loaded {} fixture prices for {}", points.len(), ticker);
            provider = provider.with_series(&ticker, points);
        }
        Ok(provider)
    }

    fn series(&self, ticker: &str) -> Result<&[ExternalPricePoint], PriceProviderError> {
        self.series
            .get(ticker)
            .map(Vec::as_slice)
            .ok_or(PriceProviderError::NotFound)
    }
}

#[async_trait]
impl PriceProvider for FixtureProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        Ok(self
            .series(ticker)?
            .iter()
            .filter(|p| p.date >= start && p.date < end_exclusive)
            .cloned()
            .collect())
    }

    async fn fetch_recent_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let points = self.series(ticker)?;
        let Some(latest) = points.last() else {
            return Ok(Vec::new());
        };
        let cutoff = latest.date - Duration::days(i64::from(days));
        Ok(points.iter().filter(|p| p.date > cutoff).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> FixtureProvider {
        let csv = "date,close\n2023-01-13,3999.09\n2023-01-11,3969.61\n2023-01-12,3983.17\n";
        FixtureProvider::new().with_series("^GSPC", FixtureProvider::parse_csv(csv.as_bytes()).unwrap())
    }

    #[test]
    fn test_parse_csv_rejects_bad_rows() {
        let csv = "date,close\n2023-01-13,not-a-number\n";
        assert!(matches!(
            FixtureProvider::parse_csv(csv.as_bytes()),
            Err(PriceProviderError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_history_is_sorted_and_end_exclusive() {
        let provider = sample();
        let points = provider
            .fetch_history("^GSPC", d(2023, 1, 11), d(2023, 1, 13))
            .await
            .unwrap();
        assert_eq!(points.iter().map(|p| p.date).collect::<Vec<_>>(), vec![d(2023, 1, 11), d(2023, 1, 12)]);
    }

    #[tokio::test]
    async fn test_recent_history_counts_back_from_latest_point() {
        let provider = sample();
        let points = provider.fetch_recent_history("^GSPC", 2).await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points.last().unwrap().close, 3999.09);
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_not_found() {
        let provider = sample();
        assert!(matches!(
            provider.fetch_recent_history("NOPE", 5).await,
            Err(PriceProviderError::NotFound)
        ));
    }
}
