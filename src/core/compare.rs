use serde::Serialize;

use super::engine::project;
use super::types::{Debt, DebtProjection, DebtStrategy, ProjectionOptions};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub projection: DebtProjection,
    /// Interest saved versus paying minimums only; negative when worse.
    pub interest_saved: f64,
    pub months_saved: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub extra_monthly_payment: f64,
    pub snowball: StrategyOutcome,
    pub avalanche: StrategyOutcome,
    pub minimums: StrategyOutcome,
    pub recommended: Option<DebtStrategy>,
}

impl StrategyComparison {
    pub fn outcome(&self, strategy: DebtStrategy) -> &StrategyOutcome {
        match strategy {
            DebtStrategy::Snowball => &self.snowball,
            DebtStrategy::Avalanche => &self.avalanche,
            DebtStrategy::Minimums => &self.minimums,
        }
    }
}

pub fn compare_strategies(
    debts: &[Debt],
    extra_monthly_payment: f64,
    monthly_cap_safety: u32,
) -> StrategyComparison {
    let run = |strategy| {
        let options =
            ProjectionOptions::new(strategy, extra_monthly_payment).with_cap(monthly_cap_safety);
        project(debts, &options)
    };

    let baseline = run(DebtStrategy::Minimums);
    let snowball = outcome_against(run(DebtStrategy::Snowball), &baseline);
    let avalanche = outcome_against(run(DebtStrategy::Avalanche), &baseline);
    let minimums = outcome_against(baseline.clone(), &baseline);

    let recommended = recommend([&avalanche, &snowball, &minimums]);

    StrategyComparison {
        extra_monthly_payment: snowball.projection.extra_monthly_payment,
        snowball,
        avalanche,
        minimums,
        recommended,
    }
}

fn outcome_against(projection: DebtProjection, baseline: &DebtProjection) -> StrategyOutcome {
    StrategyOutcome {
        interest_saved: baseline.total_interest_paid - projection.total_interest_paid,
        months_saved: i64::from(baseline.months_to_payoff) - i64::from(projection.months_to_payoff),
        projection,
    }
}

/// Lowest interest among converged outcomes, then fewest months. Earlier
/// candidates win exact ties.
fn recommend(candidates: [&StrategyOutcome; 3]) -> Option<DebtStrategy> {
    let mut best: Option<&StrategyOutcome> = None;
    for candidate in candidates {
        if !candidate.projection.converged {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => {
                let a = &candidate.projection;
                let b = &current.projection;
                a.total_interest_paid
                    .total_cmp(&b.total_interest_paid)
                    .then(a.months_to_payoff.cmp(&b.months_to_payoff))
                    .is_lt()
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best.map(|outcome| outcome.projection.strategy)
}
