//! Payoff and balance forecasting.
//!
//! Pure functions over account figures: no I/O, no persistence. Callers
//! validate inputs (payment/escrow/insurance/tax are non-negative) before
//! anything reaches this module.

/// Safety bound on the amortization simulation. Anything still carrying a
/// balance after this many months is reported as never paying off.
const MAX_PAYOFF_MONTHS: u32 = 10_000;

/// Outcome of a payoff forecast: a finite month count, or never (the
/// principal portion of the payment cannot reduce the balance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payoff {
    Months(u32),
    Never,
}

impl Payoff {
    pub fn months(&self) -> Option<u32> {
        match self {
            Self::Months(n) => Some(*n),
            Self::Never => None,
        }
    }
}

impl std::fmt::Display for Payoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Months(n) => write!(f, "{n}"),
            Self::Never => write!(f, "n/a"),
        }
    }
}

fn to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

/// Estimated months to pay off `balance` with a fixed monthly `payment`.
///
/// `escrow`, `insurance` and `tax` are fixed add-ons that never touch
/// principal; only what remains of the payment reduces the balance. With
/// interest, the balance is simulated month by month at apr/12/100; if an
/// iteration fails to strictly decrease the balance, the debt is growing or
/// static and the result is `Never`.
pub fn months_to_payoff(
    balance: f64,
    payment: f64,
    apr: f64,
    escrow: f64,
    insurance: f64,
    tax: f64,
) -> Payoff {
    let balance = balance.abs();
    let principal = payment - escrow - insurance - tax;
    if principal <= 0.0 {
        return Payoff::Never;
    }

    if apr <= 0.0 {
        // No interest: exact ceiling division on cents, no float drift.
        let months = ceil_div(to_cents(balance), to_cents(principal));
        return Payoff::Months(months.max(0) as u32);
    }

    let rate = apr / 12.0 / 100.0;
    let mut remaining = balance;
    let mut months = 0u32;
    while remaining > 0.0 {
        if months >= MAX_PAYOFF_MONTHS {
            return Payoff::Never;
        }
        let next = remaining + remaining * rate - principal;
        months += 1;
        if next <= 0.0 {
            break;
        }
        if next >= remaining {
            // Interest outruns principal; the balance will never shrink.
            return Payoff::Never;
        }
        remaining = next;
    }
    Payoff::Months(months)
}

/// Linear balance projection over a fixed horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceForecast {
    /// `months + 1` entries; entry k is the balance after k months.
    pub series: Vec<f64>,
    /// First month index at which the balance drops below zero, if any.
    pub shortfall_month: Option<usize>,
}

/// Project `initial` forward `months` months at a fixed monthly net cash
/// flow. No compounding: entry k is exactly `initial + k * monthly_net`.
pub fn forecast_balance(initial: f64, monthly_net: f64, months: u32) -> BalanceForecast {
    let series: Vec<f64> = (0..=months)
        .map(|k| initial + k as f64 * monthly_net)
        .collect();
    let shortfall_month = series.iter().position(|b| *b < 0.0);
    BalanceForecast {
        series,
        shortfall_month,
    }
}

/// Months until a bank balance drops below zero at the current monthly net,
/// without a horizon. `None` when the net is non-negative.
pub fn months_until_depleted(bank: f64, monthly_net: f64) -> Option<u32> {
    if monthly_net >= 0.0 {
        return None;
    }
    if bank <= 0.0 {
        return Some(0);
    }
    let months = ceil_div(to_cents(bank), to_cents(-monthly_net));
    Some(months as u32)
}

/// A fixed extra-payment budget split across accounts.
///
/// The invariant is that the extras never sum past `net`: setting one extra
/// clamps it to whatever the others leave available. Recomputing payoff
/// months from the current extras is the caller's job and is pure; there
/// is no state here beyond the amounts themselves.
#[derive(Debug, Clone)]
pub struct ExtraBudget {
    net: f64,
    extras: Vec<f64>,
}

impl ExtraBudget {
    pub fn new(net: f64, accounts: usize) -> Self {
        Self {
            net: net.max(0.0),
            extras: vec![0.0; accounts],
        }
    }

    /// Maximum the extra at `idx` may take: whatever the other extras leave.
    pub fn max_for(&self, idx: usize) -> f64 {
        let others: f64 = self
            .extras
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, v)| v)
            .sum();
        (self.net - others).max(0.0)
    }

    /// Set the extra at `idx`, clamped into `[0, max_for(idx)]`. Returns the
    /// value actually applied.
    pub fn set(&mut self, idx: usize, amount: f64) -> f64 {
        let applied = amount.clamp(0.0, self.max_for(idx));
        self.extras[idx] = applied;
        applied
    }

    pub fn get(&self, idx: usize) -> f64 {
        self.extras[idx]
    }

    pub fn allocated(&self) -> f64 {
        self.extras.iter().sum()
    }

    pub fn remaining(&self) -> f64 {
        (self.net - self.allocated()).max(0.0)
    }
}
