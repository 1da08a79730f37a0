use std::collections::HashSet;

use super::error::{ProjectionError, Result};
use super::types::{DEFAULT_MONTHLY_CAP, Debt};

/// Upper bound accepted from callers for the month safety cap.
pub const MAX_MONTHLY_CAP: u32 = 1200;

/// Missing extra defaults to zero; negative or non-finite values are rejected.
pub fn validate_extra(extra: Option<f64>) -> Result<f64> {
    let extra = extra.unwrap_or(0.0);
    if !extra.is_finite() || extra < 0.0 {
        return Err(ProjectionError::InvalidInput(
            "extraMonthlyPayment must be >= 0".to_string(),
        ));
    }
    Ok(extra)
}

pub fn validate_cap(cap: Option<u32>) -> Result<u32> {
    let cap = cap.unwrap_or(DEFAULT_MONTHLY_CAP);
    if cap == 0 || cap > MAX_MONTHLY_CAP {
        return Err(ProjectionError::InvalidInput(format!(
            "monthlyCapSafety must be between 1 and {MAX_MONTHLY_CAP}"
        )));
    }
    Ok(cap)
}

/// Ids must be non-blank and unique so priority ties resolve to one order.
pub fn validate_debts(debts: &[Debt]) -> Result<()> {
    let mut seen = HashSet::new();
    for debt in debts {
        let id = debt.id.trim();
        if id.is_empty() {
            return Err(ProjectionError::InvalidInput(
                "every debt needs a non-empty id".to_string(),
            ));
        }
        if !seen.insert(id) {
            return Err(ProjectionError::InvalidInput(format!(
                "duplicate debt id {id:?}"
            )));
        }
        for (field, value) in [
            ("currentBalance", debt.current_balance),
            ("interestRateAnnual", debt.interest_rate_annual),
            ("minimumPayment", debt.minimum_payment),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProjectionError::InvalidInput(format!(
                    "debt {id:?}: {field} must be >= 0"
                )));
            }
        }
    }
    Ok(())
}
