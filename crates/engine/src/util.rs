//! Internal helpers for input validation and date handling.
//!
//! These utilities are **not** part of the public API.

use chrono::{Datelike, Months, NaiveDate};

use crate::{EngineError, MoneyCents, ResultEngine};

/// Inclusive `[first_day, last_day]` of the month containing `input`
/// (`YYYY-MM-DD`). Returns `None` when `input` is not a valid date.
pub(crate) fn month_range(input: &str) -> Option<(NaiveDate, NaiveDate)> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()?;
    let first = date.with_day(1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Transaction amounts lie in `0..=MoneyCents::MAX_AMOUNT`.
pub(crate) fn ensure_transaction_amount(amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "amount must be >= 0".to_string(),
        ));
    }
    if amount > MoneyCents::MAX_AMOUNT {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be <= {}",
            MoneyCents::MAX_AMOUNT
        )));
    }
    Ok(())
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
