use serde_json::Value;

use crate::error::{AppError, AppResult};

const INVALID_AMOUNT: &str = "Amount must be a positive number";

/// Largest accepted amount in major units. Keeps minor units exact in an
/// f64 and well inside i64.
const MAX_AMOUNT: f64 = 10_000_000_000_000.0;

/// A validated, strictly positive amount in major currency units.
///
/// Keeps the literal text the client sent so that payloads which embed the
/// amount verbatim (BillDesk) see exactly what was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Amount {
    literal: String,
    value: f64,
}

impl Amount {
    /// Accepts a JSON number or a plain decimal string such as `"100.50"`.
    pub fn from_json(value: Option<&Value>) -> AppResult<Self> {
        match value {
            Some(Value::Number(number)) => {
                let literal = number.to_string();
                if !is_plain_decimal(&literal) {
                    return Err(AppError::Validation(INVALID_AMOUNT.to_string()));
                }
                let value = number
                    .as_f64()
                    .ok_or_else(|| AppError::Validation(INVALID_AMOUNT.to_string()))?;
                Self::checked(literal, value)
            }
            Some(Value::String(text)) => Self::parse(text),
            _ => Err(AppError::Validation(INVALID_AMOUNT.to_string())),
        }
    }

    pub fn parse(text: &str) -> AppResult<Self> {
        let literal = text.trim();
        if !is_plain_decimal(literal) {
            return Err(AppError::Validation(INVALID_AMOUNT.to_string()));
        }

        let value = literal
            .parse::<f64>()
            .map_err(|_| AppError::Validation(INVALID_AMOUNT.to_string()))?;
        Self::checked(literal.to_string(), value)
    }

    fn checked(literal: String, value: f64) -> AppResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::Validation(INVALID_AMOUNT.to_string()));
        }
        if value > MAX_AMOUNT {
            return Err(AppError::Validation(format!(
                "Amount must not exceed {}",
                MAX_AMOUNT as i64
            )));
        }
        Ok(Self { literal, value })
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// Amount in minor units (paise), rounded to the nearest unit.
    pub fn minor_units(&self) -> i64 {
        (self.value * 100.0).round() as i64
    }
}

fn is_plain_decimal(text: &str) -> bool {
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();

    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match fraction {
        Some(fraction) => {
            (!whole.is_empty() || !fraction.is_empty()) && digits(whole) && digits(fraction)
        }
        None => !whole.is_empty() && digits(whole),
    }
}
