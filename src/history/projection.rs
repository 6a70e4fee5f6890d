//! Orders the aggregated history and filters it by expansion state for display.
//!
//! Years and months come out newest first. Category rows are sorted by day,
//! oldest first, with ties kept in the order the labels were first aggregated.
//! Months of a collapsed year and rows of a collapsed month are never built.

use rust_decimal::Decimal;

use super::{
    aggregation::{AggregatedHistory, AggregatedMonth, AggregatedYear, CategoryMap},
    expansion::{ExpansionState, YearMonth},
    summary::{BalanceSign, Totals, month_totals, percent_of, year_totals},
};

/// One year of the history, ready for rendering.
#[derive(Debug, PartialEq)]
pub struct YearBlock<'a> {
    /// The calendar year.
    pub year: i32,
    /// The year's running totals.
    pub totals: Totals,
    /// The sign of the year's balance.
    pub balance_sign: BalanceSign,
    /// `None` while the year is collapsed.
    pub months: Option<Vec<MonthBlock<'a>>>,
}

impl YearBlock<'_> {
    /// Whether the year's months are shown.
    pub fn is_expanded(&self) -> bool {
        self.months.is_some()
    }
}

/// One month of a year, ready for rendering.
#[derive(Debug, PartialEq)]
pub struct MonthBlock<'a> {
    /// Which month of which year this is.
    pub key: YearMonth,
    /// The month's totals, recomputed from its categories.
    pub totals: Totals,
    /// The sign of the month's balance.
    pub balance_sign: BalanceSign,
    /// `None` while the month is collapsed.
    pub rows: Option<MonthRows<'a>>,
}

impl MonthBlock<'_> {
    /// Whether the month's category rows are shown.
    pub fn is_expanded(&self) -> bool {
        self.rows.is_some()
    }
}

/// The category rows of an expanded month.
#[derive(Debug, PartialEq)]
#[allow(missing_docs)]
pub struct MonthRows<'a> {
    pub income: Vec<CategoryRow<'a>>,
    pub expenses: Vec<CategoryRow<'a>>,
}

/// A category within a month.
#[derive(Debug, PartialEq)]
pub struct CategoryRow<'a> {
    /// The category label, untruncated.
    pub label: &'a str,
    /// The summed value of the category.
    pub value: Decimal,
    /// The day of the last transaction in the category.
    pub day: u8,
    /// Share of the month's total for the same transaction type.
    pub percent: i64,
}

/// Lazily project `history` into year blocks, newest year first.
pub fn project<'a>(
    history: &'a AggregatedHistory,
    expansion: &'a ExpansionState,
) -> impl Iterator<Item = YearBlock<'a>> + 'a {
    history
        .years
        .iter()
        .rev()
        .map(move |(&year, data)| year_block(year, data, expansion))
}

fn year_block<'a>(
    year: i32,
    data: &'a AggregatedYear,
    expansion: &ExpansionState,
) -> YearBlock<'a> {
    let totals = year_totals(data);
    let months = expansion.is_year_expanded(year).then(|| {
        data.months
            .iter()
            .rev()
            .map(|(&month, month_data)| {
                month_block(YearMonth::new(year, month), month_data, expansion)
            })
            .collect()
    });

    YearBlock {
        year,
        totals,
        balance_sign: totals.balance_sign(),
        months,
    }
}

fn month_block<'a>(
    key: YearMonth,
    data: &'a AggregatedMonth,
    expansion: &ExpansionState,
) -> MonthBlock<'a> {
    let totals = month_totals(data);
    let rows = expansion.is_month_expanded(key).then(|| MonthRows {
        income: category_rows(&data.income, totals.income),
        expenses: category_rows(&data.expenses, totals.expenses),
    });

    MonthBlock {
        key,
        totals,
        balance_sign: totals.balance_sign(),
        rows,
    }
}

fn category_rows(categories: &CategoryMap, total: Decimal) -> Vec<CategoryRow<'_>> {
    let mut rows: Vec<_> = categories
        .iter()
        .map(|entry| CategoryRow {
            label: &entry.label,
            value: entry.value,
            day: entry.day,
            percent: percent_of(entry.value, total),
        })
        .collect();

    // `sort_by_key` is stable, so rows on the same day keep their map order.
    rows.sort_by_key(|row| row.day);
    rows
}
