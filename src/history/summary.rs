//! Month and year totals, balances and category percentages.

use std::ops::AddAssign;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use super::aggregation::{AggregatedMonth, AggregatedYear, CategoryMap};

/// Income and expense sums for a month or a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// The sum of income.
    pub income: Decimal,
    /// The sum of expenses.
    pub expenses: Decimal,
}

impl Totals {
    /// Income minus expenses. Derived on demand, never stored.
    pub fn balance(&self) -> Decimal {
        self.income - self.expenses
    }

    /// The sign of [Totals::balance].
    pub fn balance_sign(&self) -> BalanceSign {
        BalanceSign::of(self.balance())
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, other: Self) {
        self.income += other.income;
        self.expenses += other.expenses;
    }
}

/// Whether a balance is shown as a surplus or a deficit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceSign {
    /// Zero or more, shown as a surplus.
    NonNegative,
    /// Less than zero, shown as a deficit.
    Negative,
}

impl BalanceSign {
    /// The sign of `balance`. Zero counts as non-negative.
    pub fn of(balance: Decimal) -> Self {
        if balance < Decimal::ZERO {
            Self::Negative
        } else {
            Self::NonNegative
        }
    }
}

fn category_total(categories: &CategoryMap) -> Decimal {
    categories.iter().map(|entry| entry.value).sum()
}

/// Totals for a month, recomputed from its category entries every time.
pub fn month_totals(month: &AggregatedMonth) -> Totals {
    Totals {
        income: category_total(&month.income),
        expenses: category_total(&month.expenses),
    }
}

/// The running totals the aggregation maintained for a year.
pub fn year_totals(year: &AggregatedYear) -> Totals {
    Totals {
        income: year.total_income,
        expenses: year.total_expenses,
    }
}

/// The sum of a year's month totals.
///
/// This must always equal [year_totals] for the same year.
pub fn sum_of_month_totals(year: &AggregatedYear) -> Totals {
    let mut totals = Totals::default();

    for month in year.months.values() {
        totals += month_totals(month);
    }

    totals
}

/// `value` as a whole percentage of `total`, or 0 if `total` is zero.
pub fn percent_of(value: Decimal, total: Decimal) -> i64 {
    if total.is_zero() {
        0
    } else {
        (value / total * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0)
    }
}
