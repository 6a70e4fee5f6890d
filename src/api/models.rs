//! Wire types returned by the finance API's list endpoints.

use std::collections::HashMap;

use serde::Deserialize;

use crate::history::TransactionDto;

/// A list endpoint's body.
///
/// The API returns either a bare JSON array or an object wrapping the array in
/// a `data` field, depending on the endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    /// `[...]`
    Bare(Vec<T>),
    /// `{ "data": [...] }`
    Wrapped {
        /// The items.
        data: Vec<T>,
    },
}

impl<T> ListResponse<T> {
    /// The items, however they were wrapped.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// A fixed bill as listed by `/api/Fixedbills/user/{userId}`.
///
/// Only the fields needed to label transactions are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FixedBillDto {
    /// The ID transactions refer to with `fixedBillId`.
    pub id: String,
    /// The label shown in parentheses after the category.
    pub description: String,
}

/// A transaction category as listed by `/api/TransactionalDescriptions/user/{userId}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionalDescriptionDto {
    /// The ID transactions refer to with `transactionalDescriptionId`.
    pub id: String,
    /// The category label.
    pub transactional_description: String,
}

/// Labels for categories and fixed bills, keyed by ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelDirectory {
    descriptions: HashMap<String, String>,
    fixed_bills: HashMap<String, String>,
}

impl LabelDirectory {
    /// Index the category and fixed bill lists by ID.
    pub fn new(
        descriptions: Vec<TransactionalDescriptionDto>,
        fixed_bills: Vec<FixedBillDto>,
    ) -> Self {
        Self {
            descriptions: descriptions
                .into_iter()
                .map(|dto| (dto.id, dto.transactional_description))
                .collect(),
            fixed_bills: fixed_bills
                .into_iter()
                .map(|dto| (dto.id, dto.description))
                .collect(),
        }
    }

    /// Whether `transaction` only refers to its labels by ID.
    pub fn needs_labels(transaction: &TransactionDto) -> bool {
        let missing_description = transaction.transactional_description.is_none()
            && transaction.transactional_description_id.is_some();
        let missing_fixed_bill =
            transaction.fixed_bill_description.is_none() && transaction.fixed_bill_id.is_some();

        missing_description || missing_fixed_bill
    }

    /// Fill in the labels `transaction` is missing.
    ///
    /// Labels that are already present are left as they are. Unknown IDs
    /// leave the label empty, which validation then reports.
    pub fn fill(&self, transaction: &mut TransactionDto) {
        if transaction.transactional_description.is_none() {
            transaction.transactional_description = transaction
                .transactional_description_id
                .as_ref()
                .and_then(|id| self.descriptions.get(id))
                .cloned();
        }

        if transaction.fixed_bill_description.is_none() {
            transaction.fixed_bill_description = transaction
                .fixed_bill_id
                .as_ref()
                .and_then(|id| self.fixed_bills.get(id))
                .cloned();
        }
    }
}
