use super::types::{
    Debt, DebtProjection, DebtStrategy, MonthlyPayment, PAID_OFF_THRESHOLD, PayoffDetail,
    ProjectionOptions, monthly_rate,
};

#[derive(Debug)]
struct DebtState<'a> {
    debt: &'a Debt,
    starting_balance: f64,
    balance: f64,
    monthly_rate: f64,
    minimum_payment: f64,
    payoff_month: Option<u32>,
    payments: Vec<MonthlyPayment>,
}

impl<'a> DebtState<'a> {
    fn new(debt: &'a Debt) -> Self {
        let balance = finite_or_zero(debt.current_balance).max(0.0);
        Self {
            debt,
            starting_balance: balance,
            balance,
            monthly_rate: monthly_rate(finite_or_zero(debt.interest_rate_annual)),
            minimum_payment: finite_or_zero(debt.minimum_payment).max(0.0),
            payoff_month: if balance > PAID_OFF_THRESHOLD {
                None
            } else {
                Some(0)
            },
            payments: Vec::new(),
        }
    }

    fn is_active(&self) -> bool {
        self.balance > PAID_OFF_THRESHOLD
    }

    fn pay_month(&mut self, month: u32, extra: f64) {
        // Interest accrues on the pre-payment balance.
        let interest = self.balance * self.monthly_rate;
        let accrued = self.balance + interest;

        let mut payment = (self.minimum_payment + extra).min(accrued).max(0.0);
        let mut balance = accrued - payment;
        if balance <= PAID_OFF_THRESHOLD {
            payment = accrued.max(0.0);
            balance = 0.0;
            self.payoff_month = Some(month);
        }

        self.balance = balance;
        self.payments.push(MonthlyPayment {
            month,
            payment,
            interest,
            principal: payment - interest,
            balance,
        });
    }

    fn into_detail(self) -> PayoffDetail {
        PayoffDetail {
            debt_id: self.debt.id.clone(),
            debt_name: self.debt.name.clone(),
            starting_balance: self.starting_balance,
            ending_balance: self.balance,
            payoff_month: self.payoff_month,
            monthly_payments: self.payments,
        }
    }
}

/// Simulates month-by-month repayment of `debts` until every balance reaches
/// zero or `monthly_cap_safety` months have elapsed.
///
/// The caller is expected to pass only active debts (see [`active_debts`]).
/// The input slice is never mutated; hitting the cap is reported through
/// `converged == false` rather than as an error.
pub fn project(debts: &[Debt], options: &ProjectionOptions) -> DebtProjection {
    let extra = effective_extra_payment(options);
    let mut states = priority_order(debts, options.strategy)
        .into_iter()
        .map(|idx| DebtState::new(&debts[idx]))
        .collect::<Vec<_>>();

    let mut month = 0;
    while month < options.monthly_cap_safety && states.iter().any(DebtState::is_active) {
        month += 1;
        // The whole extra pool goes to the first unpaid debt in priority order.
        let target = states.iter().position(DebtState::is_active);
        for (idx, state) in states.iter_mut().enumerate() {
            if !state.is_active() {
                continue;
            }
            let extra_for_debt = if Some(idx) == target { extra } else { 0.0 };
            state.pay_month(month, extra_for_debt);
        }
    }

    build_projection(options.strategy, extra, month, states)
}

/// Debts eligible for projection: not archived and carrying a balance.
pub fn active_debts(debts: &[Debt]) -> Vec<Debt> {
    debts
        .iter()
        .filter(|debt| !debt.is_archived && !debt.is_paid_off())
        .cloned()
        .collect()
}

fn build_projection(
    strategy: DebtStrategy,
    extra: f64,
    months: u32,
    states: Vec<DebtState<'_>>,
) -> DebtProjection {
    let converged = states.iter().all(|state| !state.is_active());

    let mut total_interest_paid = 0.0;
    let mut total_principal_paid = 0.0;
    for payment in states.iter().flat_map(|state| state.payments.iter()) {
        total_interest_paid += payment.interest;
        total_principal_paid += payment.principal;
    }

    DebtProjection {
        strategy,
        extra_monthly_payment: extra,
        months_to_payoff: months,
        converged,
        total_interest_paid,
        total_principal_paid,
        payoff_details: states.into_iter().map(DebtState::into_detail).collect(),
    }
}

fn effective_extra_payment(options: &ProjectionOptions) -> f64 {
    if options.strategy.uses_extra_payment() {
        finite_or_zero(options.extra_monthly_payment).max(0.0)
    } else {
        0.0
    }
}

/// Indices into `debts` in payoff priority; ties fall back to ascending id.
fn priority_order(debts: &[Debt], strategy: DebtStrategy) -> Vec<usize> {
    let mut order = (0..debts.len()).collect::<Vec<_>>();
    match strategy {
        DebtStrategy::Snowball => order.sort_by(|&a, &b| {
            debts[a]
                .current_balance
                .total_cmp(&debts[b].current_balance)
                .then_with(|| debts[a].id.cmp(&debts[b].id))
        }),
        DebtStrategy::Avalanche => order.sort_by(|&a, &b| {
            debts[b]
                .interest_rate_annual
                .total_cmp(&debts[a].interest_rate_annual)
                .then_with(|| debts[a].id.cmp(&debts[b].id))
        }),
        DebtStrategy::Minimums => {}
    }
    order
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
