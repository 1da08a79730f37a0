//! Advisory text built on top of a projection.
//!
//! The hosted coach lives behind [`Advisor`]; the engine never calls it and
//! any implementation may decline to answer by returning `None`.

use serde::{Deserialize, Serialize};

use super::types::{Debt, DebtProjection, DebtStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialContext {
    pub monthly_income: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub currency: String,
}

impl Default for FinancialContext {
    fn default() -> Self {
        Self {
            monthly_income: None,
            monthly_expenses: None,
            currency: "USD".to_string(),
        }
    }
}

pub trait Advisor: Send + Sync {
    fn explain_strategy(&self, strategy: DebtStrategy) -> Option<String>;

    fn summarize_projection(
        &self,
        projection: &DebtProjection,
        debts: &[Debt],
        context: &FinancialContext,
    ) -> Option<String>;
}

/// Stand-in for an unavailable collaborator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAdvisor;

impl Advisor for NoAdvisor {
    fn explain_strategy(&self, _strategy: DebtStrategy) -> Option<String> {
        None
    }

    fn summarize_projection(
        &self,
        _projection: &DebtProjection,
        _debts: &[Debt],
        _context: &FinancialContext,
    ) -> Option<String> {
        None
    }
}

/// Deterministic, template-based advice used when no language model is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedAdvisor;

impl Advisor for RuleBasedAdvisor {
    fn explain_strategy(&self, strategy: DebtStrategy) -> Option<String> {
        let text = match strategy {
            DebtStrategy::Snowball => {
                "Snowball pays the smallest balance first. Each debt you clear is a quick win, \
                 and the extra payment then moves on to the next smallest balance."
            }
            DebtStrategy::Avalanche => {
                "Avalanche pays the highest interest rate first. It usually costs the least \
                 interest overall, although the first payoff can take longer."
            }
            DebtStrategy::Minimums => {
                "Minimums pays only the required amount on every debt. It is the baseline \
                 the other strategies are measured against."
            }
        };
        Some(text.to_string())
    }

    fn summarize_projection(
        &self,
        projection: &DebtProjection,
        debts: &[Debt],
        context: &FinancialContext,
    ) -> Option<String> {
        if projection.payoff_details.is_empty() {
            return Some("There are no active debts to pay off.".to_string());
        }

        let currency = context.currency.as_str();
        let mut lines = Vec::new();

        let extra = if projection.extra_monthly_payment > 0.0 {
            format!(
                " with an extra {} per month",
                money(projection.extra_monthly_payment, currency)
            )
        } else {
            String::new()
        };

        if projection.converged {
            let subject = match projection.payoff_details.len() {
                1 => "the debt is".to_string(),
                n => format!("all {n} debts are"),
            };
            lines.push(format!(
                "Using the {} strategy{extra}, {subject} paid off in {}.",
                projection.strategy,
                describe_months(projection.months_to_payoff)
            ));
            let order = projection
                .payoff_order()
                .into_iter()
                .filter_map(|id| projection.detail(id))
                .filter_map(|d| {
                    d.payoff_month.map(|month| {
                        format!("{} (month {month})", display_name(&d.debt_name, &d.debt_id))
                    })
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("Payoff order: {order}."));
        } else {
            lines.push(format!(
                "Using the {} strategy{extra}, the debts are not paid off within {}.",
                projection.strategy,
                describe_months(projection.months_to_payoff)
            ));
            let underwater = debts
                .iter()
                .filter(|d| d.minimum_payment < d.monthly_interest())
                .map(|d| display_name(&d.name, &d.id))
                .collect::<Vec<_>>();
            if !underwater.is_empty() {
                lines.push(format!(
                    "Minimum payments do not cover the monthly interest on: {}.",
                    underwater.join(", ")
                ));
            }
        }

        lines.push(format!(
            "Total interest: {}; total paid: {}.",
            money(projection.total_interest_paid, currency),
            money(projection.total_paid(), currency)
        ));

        if let Some(income) = context.monthly_income.filter(|v| *v > 0.0) {
            let minimums = debts.iter().map(|d| d.minimum_payment.max(0.0)).sum::<f64>();
            lines.push(format!(
                "Minimum payments take {:.1}% of monthly income.",
                minimums / income * 100.0
            ));
            if let Some(expenses) = context.monthly_expenses {
                let left = income - expenses - minimums - projection.extra_monthly_payment;
                lines.push(format!(
                    "After expenses and debt payments, {} is left each month.",
                    money(left, currency)
                ));
            }
        }

        Some(lines.join(" "))
    }
}

fn display_name<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.trim().is_empty() { id } else { name }
}

fn money(amount: f64, currency: &str) -> String {
    format!("{currency} {amount:.2}")
}

fn describe_months(months: u32) -> String {
    let plural = |n: u32| if n == 1 { "" } else { "s" };
    match (months / 12, months % 12) {
        (0, m) => format!("{m} month{}", plural(m)),
        (y, 0) => format!("{y} year{}", plural(y)),
        (y, m) => format!("{y} year{} {m} month{}", plural(y), plural(m)),
    }
}
