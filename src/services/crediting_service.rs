use tracing::debug;

use crate::models::{AccountSnapshot, Allocation, AllocationResult};
use crate::utils::round_to;

/// A rate takes part in crediting only when it is a finite, positive number.
/// Zero and absent are treated the same way: the step is skipped.
fn applied(rate: Option<f64>) -> Option<f64> {
    rate.filter(|r| r.is_finite() && *r > 0.0)
}

/// Point-to-point crediting for one indexed allocation.
///
/// Steps run in a fixed order: spread is deducted from the raw gain, participation
/// scales what is left, the cap bounds the result and the whole thing floors at 0.
/// Returns a percentage rounded to 4 decimals. Never negative.
pub fn calculate_credited_return(
    index_return: Option<f64>,
    cap_rate: Option<f64>,
    par_rate: Option<f64>,
    spread_rate: Option<f64>,
) -> f64 {
    let Some(index_return) = index_return.filter(|r| r.is_finite() && *r > 0.0) else {
        return 0.0;
    };

    let mut credited = index_return;

    if let Some(spread) = applied(spread_rate) {
        credited -= spread;
        if credited <= 0.0 {
            return 0.0;
        }
    }

    if let Some(par) = applied(par_rate) {
        credited *= par / 100.0;
    }

    if let Some(cap) = applied(cap_rate) {
        credited = credited.min(cap);
    }

    round_to(credited, 4).max(0.0)
}

fn credit_allocation(current_value: f64, alloc: &Allocation) -> (AllocationResult, f64) {
    let alloc_amount = current_value * (alloc.allocation_pct / 100.0);

    let credited = if alloc.is_fixed {
        alloc.fixed_rate.filter(|r| r.is_finite()).unwrap_or(0.0)
    } else {
        calculate_credited_return(
            alloc.index_return,
            alloc.cap_rate,
            alloc.par_rate,
            alloc.spread_rate,
        )
    };

    let new_amount = alloc_amount * (1.0 + credited / 100.0);

    let result = AllocationResult {
        name: alloc.name.clone(),
        allocation_pct: alloc.allocation_pct,
        alloc_amount: round_to(alloc_amount, 2),
        index_return: if alloc.is_fixed { None } else { alloc.index_return },
        credited_return: round_to(credited, 4),
        new_amount: round_to(new_amount, 2),
        cap_rate: alloc.cap_rate,
        par_rate: alloc.par_rate,
        spread_rate: alloc.spread_rate,
        fixed_rate: alloc.fixed_rate,
        is_fixed: alloc.is_fixed,
    };

    (result, new_amount)
}

/// Credit every allocation and roll them up into a new account value.
///
/// Output rows keep the input order. `new_value` is the unrounded sum of the new
/// amounts, rounded to cents once at the end. Weights are not checked to sum to 100.
pub fn calculate_account_value(current_value: f64, allocations: &[Allocation]) -> AccountSnapshot {
    let mut total_new = 0.0;
    let mut results = Vec::with_capacity(allocations.len());

    for alloc in allocations {
        let (result, new_amount) = credit_allocation(current_value, alloc);
        debug!(
            "Credited {} ({}%): {}% -> {}",
            result.name, result.allocation_pct, result.credited_return, result.new_amount
        );
        total_new += new_amount;
        results.push(result);
    }

    let new_value = round_to(total_new, 2);
    let total_return_pct = if current_value > 0.0 {
        round_to((new_value - current_value) / current_value * 100.0, 4)
    } else {
        0.0
    };

    AccountSnapshot {
        current_value,
        new_value,
        total_return_pct,
        allocations: results,
    }
}
