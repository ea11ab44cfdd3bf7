use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::allocation::AllocationResult;
use crate::utils::number::deserialize_lenient_f64;

/// Body of `POST /api/report`; the allocations are the rows returned by `/api/calculate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub annuity_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub current_value: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub new_value: Option<f64>,
    #[serde(default)]
    pub allocations: Vec<AllocationResult>,
    #[serde(default)]
    pub index_date: Option<String>,
    #[serde(default)]
    pub advisor_name: Option<String>,
    #[serde(default)]
    pub advisor_title: Option<String>,
}

/// Validated report content handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInput {
    pub client_name: String,
    pub annuity_name: String,
    pub current_value: f64,
    pub new_value: f64,
    pub allocations: Vec<AllocationResult>,
    /// Measurement-period label, free text.
    pub index_date: String,
    pub advisor_name: String,
    pub advisor_title: String,
    pub report_date: NaiveDate,
}

impl ReportInput {
    pub fn total_return_pct(&self) -> f64 {
        if self.current_value > 0.0 {
            (self.new_value - self.current_value) / self.current_value * 100.0
        } else {
            0.0
        }
    }

    pub fn gain(&self) -> f64 {
        self.new_value - self.current_value
    }
}

/// Firm details printed on every report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBranding {
    pub firm_name: String,
    pub firm_address: String,
    pub file_prefix: String,
}
