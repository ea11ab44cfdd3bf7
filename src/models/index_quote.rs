use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexReturnQuote {
    pub ticker: String,
    /// Trading day actually used for the start price.
    pub start_date: NaiveDate,
    pub start_price: f64,
    pub end_date: NaiveDate,
    pub end_price: f64,
    /// Point-to-point change in percent, 4 decimals.
    pub index_return: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexReturnRequest {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartDateQuery {
    #[serde(default)]
    pub start_date: Option<String>,
}
