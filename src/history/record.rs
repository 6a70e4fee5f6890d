//! The transaction record model and its validation from the API's wire format.
//!
//! The persistence API is loose about types: amounts may arrive as JSON
//! numbers or as numeric strings, ids may be strings or numbers. A
//! [TransactionDto] accepts all of that, and [TransactionDto::validate]
//! turns it into a strict [TransactionRecord] or explains which field is wrong.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// The largest amount a single transaction may have, one quadrillion.
///
/// Keeps every sum the aggregation builds far below the range of [Decimal],
/// whatever the number of records.
// 10^15 split into 32-bit words: mid = 0x38D7E, lo = 0xA4C6_8000.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Whether money left or entered the user's pocket.
///
/// The API encodes this as `typeTransaction`, 1 for expenses and 2 for income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Money spent, `typeTransaction = 1`.
    Expense,
    /// Money earned, `typeTransaction = 2`.
    Income,
}

impl TransactionType {
    /// Map the API's numeric code to a transaction type.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Expense),
            2 => Some(Self::Income),
            _ => None,
        }
    }
}

/// A validated financial transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Opaque identifier assigned by the API.
    pub id: String,
    /// The owner of the transaction.
    pub user_id: String,
    /// Partitions the transaction into income or expenses within a month.
    pub transaction_type: TransactionType,
    /// The amount of money, from zero up to [MAX_AMOUNT].
    pub value: Decimal,
    /// Calendar day, 1 to 31. Not checked against the length of the month.
    pub day: u8,
    /// Calendar month, 1 to 12.
    pub month: u8,
    /// Four-digit calendar year.
    pub year: i32,
    /// The display key the transaction is grouped under within a month.
    pub category_label: String,
}

/// Build the label a transaction is grouped under.
///
/// A fixed-bill label qualifies the description in parentheses, e.g.
/// "Moradia (Aluguel)". Blank fixed-bill labels are ignored.
pub fn category_label(description: &str, fixed_bill: Option<&str>) -> String {
    let description = description.trim();

    match fixed_bill.map(str::trim) {
        Some(fixed_bill) if !fixed_bill.is_empty() => format!("{description} ({fixed_bill})"),
        _ => description.to_owned(),
    }
}

/// A record from the API that could not be turned into a [TransactionRecord].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transaction record {index}: field `{field}` {problem}")]
pub struct DataShapeError {
    /// The position of the offending record in the API response.
    pub index: usize,
    /// The wire name of the offending field.
    pub field: &'static str,
    /// What is wrong with the field.
    pub problem: String,
}

impl DataShapeError {
    fn new(index: usize, field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            index,
            field,
            problem: problem.into(),
        }
    }

    fn missing(index: usize, field: &'static str) -> Self {
        Self::new(index, field, "is missing")
    }
}

/// A financial transaction exactly as the API serializes it.
///
/// Labels may be embedded (`transactionalDescription`, `fixedBillDescription`)
/// or only referenced by id, in which case the API client fills them in before
/// validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TransactionDto {
    /// A string or numeric ID.
    pub id: Option<Value>,
    pub user_id: Option<String>,
    /// `1` for an expense, `2` for income.
    pub type_transaction: Option<Value>,
    /// A JSON number or a numeric string.
    pub value: Option<Value>,
    pub day: Option<Value>,
    pub month: Option<Value>,
    pub year: Option<Value>,
    /// The category label.
    pub transactional_description: Option<String>,
    /// The fixed bill label, if the transaction pays a fixed bill.
    pub fixed_bill_description: Option<String>,
    pub transactional_description_id: Option<String>,
    pub fixed_bill_id: Option<String>,
}

impl TransactionDto {
    /// Check every field and build a [TransactionRecord].
    ///
    /// `index` is the record's position in the API response and is only used
    /// to make errors traceable.
    ///
    /// # Errors
    /// Returns a [DataShapeError] if a required field is missing, a number
    /// cannot be read, or a value is out of range. Missing numbers are never
    /// defaulted to zero.
    pub fn validate(self, index: usize) -> Result<TransactionRecord, DataShapeError> {
        let id = match self.id {
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            Some(Value::Number(id)) => id.to_string(),
            // Blank strings fall through to here.
            Some(Value::Null | Value::String(_)) | None => {
                return Err(DataShapeError::missing(index, "id"));
            }
            Some(other) => {
                return Err(DataShapeError::new(
                    index,
                    "id",
                    format!("must be a string or a number, got {other}"),
                ));
            }
        };

        let user_id = self
            .user_id
            .ok_or_else(|| DataShapeError::missing(index, "userId"))?;

        let code = integer_field(index, "typeTransaction", self.type_transaction.as_ref())?;
        let transaction_type = TransactionType::from_code(code).ok_or_else(|| {
            DataShapeError::new(
                index,
                "typeTransaction",
                format!("must be 1 (expense) or 2 (income), got {code}"),
            )
        })?;

        let value = amount_field(index, self.value.as_ref())?;
        let day = bounded_field(index, "day", self.day.as_ref(), 1, 31)?;
        let month = bounded_field(index, "month", self.month.as_ref(), 1, 12)?;
        let year = bounded_field(index, "year", self.year.as_ref(), 1000, 9999)?;

        let description = self
            .transactional_description
            .filter(|description| !description.trim().is_empty())
            .ok_or_else(|| DataShapeError::missing(index, "transactionalDescription"))?;

        Ok(TransactionRecord {
            id,
            user_id,
            transaction_type,
            value,
            day: day as u8,
            month: month as u8,
            year: year as i32,
            category_label: category_label(&description, self.fixed_bill_description.as_deref()),
        })
    }
}

fn integer_field(
    index: usize,
    field: &'static str,
    value: Option<&Value>,
) -> Result<i64, DataShapeError> {
    match value {
        None | Some(Value::Null) => Err(DataShapeError::missing(index, field)),
        Some(Value::Number(number)) => number.as_i64().ok_or_else(|| {
            DataShapeError::new(index, field, format!("must be an integer, got {number}"))
        }),
        Some(other) => Err(DataShapeError::new(
            index,
            field,
            format!("must be an integer, got {other}"),
        )),
    }
}

fn bounded_field(
    index: usize,
    field: &'static str,
    value: Option<&Value>,
    min: i64,
    max: i64,
) -> Result<i64, DataShapeError> {
    let number = integer_field(index, field, value)?;

    if (min..=max).contains(&number) {
        Ok(number)
    } else {
        Err(DataShapeError::new(
            index,
            field,
            format!("must be between {min} and {max}, got {number}"),
        ))
    }
}

fn amount_field(index: usize, value: Option<&Value>) -> Result<Decimal, DataShapeError> {
    let text = match value {
        None | Some(Value::Null) => return Err(DataShapeError::missing(index, "value")),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => text.trim().to_owned(),
        Some(other) => {
            return Err(DataShapeError::new(
                index,
                "value",
                format!("must be a number, got {other}"),
            ));
        }
    };

    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| DataShapeError::new(index, "value", format!("is not a number: {text:?}")))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DataShapeError::new(
            index,
            "value",
            format!("must not be negative, got {amount}"),
        ));
    }

    if amount > MAX_AMOUNT {
        return Err(DataShapeError::new(
            index,
            "value",
            format!("must be at most {MAX_AMOUNT}, got {amount}"),
        ));
    }

    Ok(amount)
}
