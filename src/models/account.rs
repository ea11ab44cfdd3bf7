use serde::{Deserialize, Serialize};

use crate::models::allocation::{Allocation, AllocationResult};
use crate::utils::number::deserialize_lenient_f64;

/// Account value before and after one crediting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub current_value: f64,
    pub new_value: f64,
    pub total_return_pct: f64,
    pub allocations: Vec<AllocationResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculateRequest {
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}
