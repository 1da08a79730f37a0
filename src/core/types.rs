use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ProjectionError;

/// Balances at or below this amount count as paid off.
pub const PAID_OFF_THRESHOLD: f64 = 0.01;

/// One hundred years of monthly payments.
pub const DEFAULT_MONTHLY_CAP: u32 = 1200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStrategy {
    Snowball,
    Avalanche,
    Minimums,
}

impl DebtStrategy {
    pub const ALL: [DebtStrategy; 3] = [
        DebtStrategy::Snowball,
        DebtStrategy::Avalanche,
        DebtStrategy::Minimums,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DebtStrategy::Snowball => "snowball",
            DebtStrategy::Avalanche => "avalanche",
            DebtStrategy::Minimums => "minimums",
        }
    }

    /// Whether the extra payment pool is applied under this strategy.
    pub fn uses_extra_payment(self) -> bool {
        !matches!(self, DebtStrategy::Minimums)
    }
}

impl fmt::Display for DebtStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebtStrategy {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowball" => Ok(DebtStrategy::Snowball),
            "avalanche" => Ok(DebtStrategy::Avalanche),
            "minimums" | "minimum" | "min" => Ok(DebtStrategy::Minimums),
            _ => Err(ProjectionError::UnknownStrategy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "current_balance", alias = "balance")]
    pub current_balance: f64,
    #[serde(alias = "interest_rate_annual", alias = "interestRate")]
    pub interest_rate_annual: f64,
    #[serde(alias = "minimum_payment", alias = "minPayment")]
    pub minimum_payment: f64,
    #[serde(default, alias = "is_archived")]
    pub is_archived: bool,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        current_balance: f64,
        interest_rate_annual: f64,
        minimum_payment: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            current_balance,
            interest_rate_annual,
            minimum_payment,
            is_archived: false,
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.current_balance.is_nan() || self.current_balance <= PAID_OFF_THRESHOLD
    }

    /// Interest the debt accrues in one month at its current balance.
    pub fn monthly_interest(&self) -> f64 {
        self.current_balance * monthly_rate(self.interest_rate_annual)
    }
}

/// Annual percentage rate to a monthly fraction, e.g. 12.0 -> 0.01.
pub fn monthly_rate(interest_rate_annual: f64) -> f64 {
    interest_rate_annual / 100.0 / 12.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionOptions {
    pub strategy: DebtStrategy,
    pub extra_monthly_payment: f64,
    pub monthly_cap_safety: u32,
}

impl ProjectionOptions {
    pub fn new(strategy: DebtStrategy, extra_monthly_payment: f64) -> Self {
        Self {
            strategy,
            extra_monthly_payment,
            monthly_cap_safety: DEFAULT_MONTHLY_CAP,
        }
    }

    pub fn with_cap(mut self, monthly_cap_safety: u32) -> Self {
        self.monthly_cap_safety = monthly_cap_safety;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPayment {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffDetail {
    pub debt_id: String,
    pub debt_name: String,
    pub starting_balance: f64,
    pub ending_balance: f64,
    pub payoff_month: Option<u32>,
    pub monthly_payments: Vec<MonthlyPayment>,
}

impl PayoffDetail {
    pub fn total_interest(&self) -> f64 {
        self.monthly_payments.iter().map(|p| p.interest).sum()
    }

    pub fn total_paid(&self) -> f64 {
        self.monthly_payments.iter().map(|p| p.payment).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtProjection {
    pub strategy: DebtStrategy,
    pub extra_monthly_payment: f64,
    pub months_to_payoff: u32,
    pub converged: bool,
    pub total_interest_paid: f64,
    pub total_principal_paid: f64,
    pub payoff_details: Vec<PayoffDetail>,
}

impl DebtProjection {
    pub fn total_paid(&self) -> f64 {
        self.total_interest_paid + self.total_principal_paid
    }

    /// Debt ids in the order they reach zero; unpaid debts are omitted.
    pub fn payoff_order(&self) -> Vec<&str> {
        let mut paid: Vec<(u32, usize, &str)> = self
            .payoff_details
            .iter()
            .enumerate()
            .filter_map(|(idx, d)| d.payoff_month.map(|m| (m, idx, d.debt_id.as_str())))
            .collect();
        paid.sort_by_key(|&(month, idx, _)| (month, idx));
        paid.into_iter().map(|(_, _, id)| id).collect()
    }

    pub fn detail(&self, debt_id: &str) -> Option<&PayoffDetail> {
        self.payoff_details.iter().find(|d| d.debt_id == debt_id)
    }
}
