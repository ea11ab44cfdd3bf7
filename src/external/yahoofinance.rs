use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";

/// Yahoo Finance chart API provider. No API key required; covers index tickers such as `^GSPC`.
pub struct YahooFinanceProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl YahooFinanceProvider {
    pub fn new(timeout: Duration) -> Result<Self, PriceProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; EIATrack/0.1)")
            .timeout(timeout)
            .build()
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;
        let base_url = Url::parse(CHART_BASE_URL)
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn chart_url(&self, ticker: &str) -> Result<Url, PriceProviderError> {
        let encoded: String = url::form_urlencoded::byte_serialize(ticker.as_bytes()).collect();
        self.base_url
            .join(&encoded)
            .map_err(|e| PriceProviderError::Parse(e.to_string()))
    }

    async fn fetch_chart(
        &self,
        ticker: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let url = self.chart_url(ticker)?;
        debug!("Requesting Yahoo chart {} {:?}", url, query);

        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NotFound);
        }
        if !status.is_success() {
            return Err(PriceProviderError::BadResponse(format!("HTTP {}", status)));
        }

        let body: YahooChartResponse = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        parse_chart(body)
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: Option<YahooMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

fn parse_chart(body: YahooChartResponse) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
    if let Some(error) = body.chart.error {
        if error.description.contains("No data found") {
            return Err(PriceProviderError::NotFound);
        }
        return Err(PriceProviderError::BadResponse(error.description));
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    // Bars are stamped at the session open; shift into exchange time before taking the date.
    let offset = result.meta.map(|m| m.gmtoffset).unwrap_or(0);

    let Some(quote) = result.indicators.quote.first() else {
        return Ok(Vec::new());
    };

    if result.timestamp.len() != quote.close.len() {
        return Err(PriceProviderError::Parse(
            "Timestamp and close price arrays have different lengths".into(),
        ));
    }

    let mut points: Vec<ExternalPricePoint> = result
        .timestamp
        .iter()
        .zip(quote.close.iter())
        .filter_map(|(ts, close)| {
            // null closes show up for halted sessions
            let close = (*close)?;
            let date = chrono::DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(ExternalPricePoint { date, close })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    Ok(points)
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn range_for_days(days: u32) -> &'static str {
    if days <= 5 {
        "5d"
    } else if days <= 30 {
        "1mo"
    } else if days <= 90 {
        "3mo"
    } else {
        "1y"
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let query = [
            ("period1", unix_midnight(start).to_string()),
            ("period2", unix_midnight(end_exclusive).to_string()),
            ("interval", "1d".to_string()),
        ];
        let points = self.fetch_chart(ticker, &query).await?;

        Ok(points
            .into_iter()
            .filter(|p| p.date >= start && p.date < end_exclusive)
            .collect())
    }

    async fn fetch_recent_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let query = [
            ("range", range_for_days(days).to_string()),
            ("interval", "1d".to_string()),
        ];
        self.fetch_chart(ticker, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let body: YahooChartResponse = serde_json::from_str(raw).unwrap();
        parse_chart(body)
    }

    #[test]
    fn test_parse_chart_skips_null_closes_and_uses_exchange_offset() {
        // 2023-01-12 and 2023-01-13 14:30 UTC (09:30 New York)
        let raw = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-18000},
            "timestamp":[1673533800,1673620200,1673879400],
            "indicators":{"quote":[{"close":[3983.17,3999.09,null]}]}
        }],"error":null}}"#;

        let points = parse(raw).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2023, 1, 12).unwrap());
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2023, 1, 13).unwrap());
        assert_eq!(points[1].close, 3999.09);
    }

    #[test]
    fn test_parse_chart_no_data_error_is_not_found() {
        let raw = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(parse(raw), Err(PriceProviderError::NotFound)));
    }

    #[test]
    fn test_parse_chart_other_error_is_bad_response() {
        let raw = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        assert!(matches!(parse(raw), Err(PriceProviderError::BadResponse(_))));
    }

    #[test]
    fn test_parse_chart_without_timestamps_is_empty() {
        let raw = r#"{"chart":{"result":[{"meta":{"gmtoffset":-18000},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse(raw).unwrap().is_empty());
    }

    #[test]
    fn test_chart_url_encodes_index_ticker() {
        let provider = YahooFinanceProvider::new(Duration::from_secs(5)).unwrap();
        let url = provider.chart_url("^GSPC").unwrap();
        assert_eq!(url.as_str(), "https://query1.finance.yahoo.com/v8/finance/chart/%5EGSPC");
    }

    #[test]
    fn test_unix_midnight() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(unix_midnight(date), 1672876800);
    }
}
