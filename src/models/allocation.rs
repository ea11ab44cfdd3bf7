use serde::{Deserialize, Serialize};

use crate::utils::number::{
    deserialize_lenient_bool, deserialize_lenient_f64, deserialize_lenient_f64_or_zero,
    deserialize_lenient_string,
};

/// One line of a client's account: a weight plus either indexed crediting terms or a fixed rate.
///
/// Rates are percentages (`6.0` means 6%). A `None` rate is not applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: String,
    /// Share of the account value, 0-100.
    #[serde(default, deserialize_with = "deserialize_lenient_f64_or_zero")]
    pub allocation_pct: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub is_fixed: bool,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub index_return: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub cap_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub par_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub spread_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub fixed_rate: Option<f64>,
}

impl Allocation {
    pub fn indexed(name: &str, allocation_pct: f64, index_return: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            allocation_pct,
            index_return,
            ..Self::default()
        }
    }

    pub fn fixed(name: &str, allocation_pct: f64, fixed_rate: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            allocation_pct,
            is_fixed: true,
            fixed_rate,
            ..Self::default()
        }
    }

    pub fn with_cap(mut self, cap_rate: f64) -> Self {
        self.cap_rate = Some(cap_rate);
        self
    }

    pub fn with_par(mut self, par_rate: f64) -> Self {
        self.par_rate = Some(par_rate);
        self
    }

    pub fn with_spread(mut self, spread_rate: f64) -> Self {
        self.spread_rate = Some(spread_rate);
        self
    }
}

/// An allocation after crediting. Amounts are rounded to cents and percentages to
/// 4 decimals as they are computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_f64_or_zero")]
    pub allocation_pct: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_f64_or_zero")]
    pub alloc_amount: f64,
    /// Always `None` for fixed allocations.
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub index_return: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64_or_zero")]
    pub credited_return: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_f64_or_zero")]
    pub new_amount: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub cap_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub par_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub spread_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub fixed_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub is_fixed: bool,
}
