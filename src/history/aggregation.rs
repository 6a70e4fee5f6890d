//! Builds the year → month → category structure from a flat list of transactions.
//!
//! Aggregation is a single pass over the records. Category values are summed,
//! the category day is overwritten by the last record seen, and each year keeps
//! running income and expense totals. No display ordering is applied here, see
//! [crate::history::projection] for that.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::Error;

use super::record::{MAX_AMOUNT, TransactionDto, TransactionRecord, TransactionType};

/// The accumulated amount for one category label within a month.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    /// The display key, unique within its month and transaction type.
    pub label: String,
    /// The sum of all record values with this label.
    pub value: Decimal,
    /// The day of the most recently processed record with this label.
    pub day: u8,
}

/// Category entries keyed by label, in the order the labels were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    entries: Vec<CategoryEntry>,
}

impl CategoryMap {
    /// Add `value` to the entry for `label` and set its day to `day`,
    /// creating the entry if needed.
    pub fn upsert(&mut self, label: &str, value: Decimal, day: u8) {
        match self.get_mut(label) {
            Some(entry) => {
                entry.value += value;
                entry.day = day;
            }
            None => self.entries.push(CategoryEntry {
                label: label.to_owned(),
                value,
                day,
            }),
        }
    }

    /// The entry for `label`, if any.
    pub fn get(&self, label: &str) -> Option<&CategoryEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    /// The entry for `label`, if any, for in-place updates.
    pub fn get_mut(&mut self, label: &str) -> Option<&mut CategoryEntry> {
        self.entries.iter_mut().find(|entry| entry.label == label)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    /// The number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Income and expense categories for one month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedMonth {
    /// Income by category label.
    pub income: CategoryMap,
    /// Expenses by category label.
    pub expenses: CategoryMap,
}

impl AggregatedMonth {
    fn categories_mut(&mut self, transaction_type: TransactionType) -> &mut CategoryMap {
        match transaction_type {
            TransactionType::Income => &mut self.income,
            TransactionType::Expense => &mut self.expenses,
        }
    }
}

/// One year of aggregated transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedYear {
    /// Running sum of every income record in the year.
    pub total_income: Decimal,
    /// Running sum of every expense record in the year.
    pub total_expenses: Decimal,
    /// Months that have at least one record, keyed by month number.
    pub months: BTreeMap<u8, AggregatedMonth>,
}

/// Aggregated transactions keyed by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedHistory {
    /// Years that have at least one record.
    pub years: BTreeMap<i32, AggregatedYear>,
}

impl AggregatedHistory {
    /// Whether no records were aggregated at all.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// The aggregation for `year`, if it has any records.
    pub fn year(&self, year: i32) -> Option<&AggregatedYear> {
        self.years.get(&year)
    }

    /// The aggregation for `month` of `year`, if it has any records.
    pub fn month(&self, year: i32, month: u8) -> Option<&AggregatedMonth> {
        self.years.get(&year)?.months.get(&month)
    }

    fn add(&mut self, record: &TransactionRecord) {
        let year = self.years.entry(record.year).or_default();
        let month = year.months.entry(record.month).or_default();

        month
            .categories_mut(record.transaction_type)
            .upsert(&record.category_label, record.value, record.day);

        match record.transaction_type {
            TransactionType::Income => year.total_income += record.value,
            TransactionType::Expense => year.total_expenses += record.value,
        }
    }
}

/// Aggregate validated records into years, months and categories.
///
/// Record values must not exceed [MAX_AMOUNT], which
/// [TransactionDto::validate] guarantees.
pub fn aggregate<'a>(
    records: impl IntoIterator<Item = &'a TransactionRecord>,
) -> AggregatedHistory {
    let mut history = AggregatedHistory::default();

    for record in records {
        history.add(record);
    }

    history
}

/// Validate records straight from the API and aggregate them.
///
/// # Errors
/// Returns [Error::DataShape] for the first malformed record. No partial
/// aggregation is returned in that case.
pub fn aggregate_dtos(dtos: Vec<TransactionDto>) -> Result<AggregatedHistory, Error> {
    let record_count = dtos.len();
    let records = dtos
        .into_iter()
        .enumerate()
        .map(|(index, dto)| dto.validate(index))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|error| tracing::warn!("rejecting transactions from the API: {error}"))?;

    let history = aggregate(&records);
    tracing::debug!(
        "aggregated {record_count} transactions into {} years",
        history.years.len()
    );

    Ok(history)
}
