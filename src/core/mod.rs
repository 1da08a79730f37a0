mod advice;
mod calendar;
mod compare;
mod engine;
mod error;
mod types;
mod validate;

pub use advice::{Advisor, FinancialContext, NoAdvisor, RuleBasedAdvisor};
pub use calendar::{month_date, payoff_date, projected_completion};
pub use compare::{StrategyComparison, StrategyOutcome, compare_strategies};
pub use engine::{active_debts, project};
pub use error::{ProjectionError, Result};
pub use types::{
    DEFAULT_MONTHLY_CAP, Debt, DebtProjection, DebtStrategy, MonthlyPayment, PAID_OFF_THRESHOLD,
    PayoffDetail, ProjectionOptions, monthly_rate,
};
pub use validate::{MAX_MONTHLY_CAP, validate_cap, validate_debts, validate_extra};
