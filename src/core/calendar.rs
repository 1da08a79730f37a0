use chrono::{Months, NaiveDate};

use super::types::{DebtProjection, PayoffDetail};

/// Calendar date of simulated `month`, counting `start` as month 0.
///
/// Day-of-month is clamped to the end of shorter months, so Jan 31 plus one
/// month is the last day of February.
pub fn month_date(start: NaiveDate, month: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(month))
}

pub fn payoff_date(start: NaiveDate, detail: &PayoffDetail) -> Option<NaiveDate> {
    detail
        .payoff_month
        .and_then(|month| month_date(start, month))
}

pub fn projected_completion(start: NaiveDate, projection: &DebtProjection) -> Option<NaiveDate> {
    if !projection.converged {
        return None;
    }
    month_date(start, projection.months_to_payoff)
}
