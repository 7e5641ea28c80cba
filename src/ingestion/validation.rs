use crate::database::{MAX_AMOUNT, NewSale, is_storable_amount};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Client-caused ingestion failures. Never retried; the message is returned
/// to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide agent name and amount")]
    MissingField,
    #[error("Amount must be a number")]
    InvalidAmount,
    #[error("Amount cannot be negative")]
    NegativeAmount,
    #[error("Amount cannot exceed 999999999999.99")]
    AmountTooLarge,
    #[error("Amount has more precision than can be stored")]
    AmountTooPrecise,
    #[error("Number of sales must be at least 1")]
    InvalidCount,
    #[error("Please provide an array of sales")]
    EmptyBatch,
    #[error("No valid sales data provided")]
    NoValidRecords,
}

/// Incoming sale payload.
///
/// Fields stay loosely typed so numeric strings such as `"250.5"` are
/// accepted the same way numbers are.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    #[serde(default)]
    pub agent_name: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub number_of_sales: Option<Value>,
}

impl SaleInput {
    pub fn new(agent_name: impl Into<Value>, amount: impl Into<Value>) -> Self {
        Self {
            agent_name: Some(agent_name.into()),
            amount: Some(amount.into()),
            number_of_sales: None,
        }
    }

    pub fn with_number_of_sales(mut self, count: impl Into<Value>) -> Self {
        self.number_of_sales = Some(count.into());
        self
    }
}

/// Validate a single sale. Absent `numberOfSales` defaults to 1.
pub fn validate_sale(input: &SaleInput) -> Result<NewSale, ValidationError> {
    let agent_name = agent_name(input.agent_name.as_ref()).ok_or(ValidationError::MissingField)?;
    let amount = amount(input.amount.as_ref())?;

    let number_of_sales = match input.number_of_sales.as_ref() {
        None => 1,
        Some(value) => parse_count(value).ok_or(ValidationError::InvalidCount)?,
    };
    if number_of_sales < 1 {
        return Err(ValidationError::InvalidCount);
    }

    Ok(NewSale::new(agent_name, amount, number_of_sales))
}

/// Validate one entry of a bulk upload.
///
/// Returns `None` for entries that should be dropped from the batch. A
/// missing, zero or non-numeric `numberOfSales` falls back to 1; a negative
/// one drops the entry.
pub fn validate_bulk_entry(entry: &Value) -> Option<NewSale> {
    if !entry.is_object() {
        return None;
    }
    let input: SaleInput = serde_json::from_value(entry.clone()).ok()?;

    let agent_name = agent_name(input.agent_name.as_ref())?;
    let amount = amount(input.amount.as_ref()).ok()?;
    let number_of_sales = input
        .number_of_sales
        .as_ref()
        .and_then(parse_count)
        .filter(|&count| count != 0)
        .unwrap_or(1);
    if number_of_sales < 1 {
        return None;
    }

    Some(NewSale::new(agent_name, amount, number_of_sales))
}

fn agent_name(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(name)) if !name.trim().is_empty() => Some(name.trim().to_string()),
        _ => None,
    }
}

fn amount(value: Option<&Value>) -> Result<Decimal, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField)?;
    let amount = parse_decimal(value).ok_or(ValidationError::InvalidAmount)?;
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge);
    }
    if !is_storable_amount(amount) {
        return Err(ValidationError::AmountTooPrecise);
    }
    Ok(amount)
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn parse_count(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX))
                .map(|f| f as i32),
        },
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}
