//! Which years and months of the history are expanded.
//!
//! Expansion is presentation state. It is kept as two sets of keys next to the
//! aggregated data rather than as flags inside it, so re-aggregating never
//! changes what the user has open.

use std::{collections::HashSet, fmt};

use time::Date;

/// A calendar month within a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    /// The calendar year.
    pub year: i32,
    /// The month number, 1 to 12.
    pub month: u8,
}

impl YearMonth {
    /// Create a key for `month` of `year`.
    pub fn new(year: i32, month: u8) -> Self {
        Self { year, month }
    }
}

impl From<Date> for YearMonth {
    fn from(date: Date) -> Self {
        Self::new(date.year(), date.month() as u8)
    }
}

/// Formats as the composite key `"year-month"`, e.g. `"2024-1"`.
impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

/// The expanded years and months of one view session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    expanded_years: HashSet<i32>,
    expanded_months: HashSet<YearMonth>,
}

impl ExpansionState {
    /// Start with only the `current` year and month expanded.
    pub fn new(current: YearMonth) -> Self {
        Self {
            expanded_years: HashSet::from([current.year]),
            expanded_months: HashSet::from([current]),
        }
    }

    /// Flip `year` between expanded and collapsed.
    ///
    /// The expansion of the year's months is left alone, so re-expanding a
    /// year shows the same months as before. Returns whether the year is now
    /// expanded.
    pub fn toggle_year(&mut self, year: i32) -> bool {
        toggle(&mut self.expanded_years, year)
    }

    /// Flip `month` between expanded and collapsed, whatever its year's state.
    ///
    /// Returns whether the month is now expanded.
    pub fn toggle_month(&mut self, month: YearMonth) -> bool {
        toggle(&mut self.expanded_months, month)
    }

    /// Whether `year` is expanded.
    pub fn is_year_expanded(&self, year: i32) -> bool {
        self.expanded_years.contains(&year)
    }

    /// Whether `month` is expanded.
    pub fn is_month_expanded(&self, month: YearMonth) -> bool {
        self.expanded_months.contains(&month)
    }
}

fn toggle<T: Eq + std::hash::Hash>(set: &mut HashSet<T>, key: T) -> bool {
    if set.remove(&key) {
        false
    } else {
        set.insert(key);
        true
    }
}
