//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal, label: &str) -> CoreResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(CoreError::Validation(format!("{} must be positive", label)))
    } else {
        Ok(())
    }
}

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(amount: &BigDecimal, label: &str) -> CoreResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(CoreError::Validation(format!(
            "{} cannot be negative",
            label
        )))
    } else {
        Ok(())
    }
}

/// Validate that an amount has no fractional currency units
pub fn validate_whole_units(amount: &BigDecimal, label: &str) -> CoreResult<()> {
    if amount.with_scale(0) != *amount {
        return Err(CoreError::Validation(format!(
            "{} must be a whole currency amount, got {}",
            label, amount
        )));
    }
    Ok(())
}

/// Validate a physical dimension: finite and strictly positive
pub fn validate_dimension(value: f64, label: &str) -> CoreResult<()> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!("{} must be a number", label)));
    }
    if value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{} must be positive, got {}",
            label, value
        )));
    }
    Ok(())
}

/// Validate a line item quantity
pub fn validate_quantity(quantity: u32) -> CoreResult<()> {
    if quantity == 0 {
        return Err(CoreError::Validation(
            "Quantity must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a discount percentage lies in [0, 100]
pub fn validate_discount_percent(percent: &BigDecimal) -> CoreResult<()> {
    if *percent < BigDecimal::from(0) || *percent > BigDecimal::from(100) {
        return Err(CoreError::Validation(format!(
            "Discount must be between 0 and 100 percent, got {}",
            percent
        )));
    }
    Ok(())
}

/// Validate that an advance is non-negative and does not exceed the total
pub fn validate_advance(advance: &BigDecimal, total: &BigDecimal) -> CoreResult<()> {
    validate_non_negative_amount(advance, "Advance")?;
    if advance > total {
        return Err(CoreError::Validation(format!(
            "Advance {} exceeds total {}",
            advance, total
        )));
    }
    Ok(())
}

/// Validate a free-text description
pub fn validate_description(description: &str, max_len: usize) -> CoreResult<()> {
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "Description cannot be empty".to_string(),
        ));
    }

    if description.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "Description cannot exceed {} characters",
            max_len
        )));
    }

    Ok(())
}

/// Stricter entry validator used when `ledger.strict_validation` is enabled
pub struct StrictEntryValidator {
    pub max_description_len: usize,
}

impl StrictEntryValidator {
    pub fn new(max_description_len: usize) -> Self {
        Self {
            max_description_len,
        }
    }
}

impl EntryValidator for StrictEntryValidator {
    fn validate_entry(&self, entry: &LedgerEntry) -> CoreResult<()> {
        DefaultEntryValidator.validate_entry(entry)?;
        validate_whole_units(&entry.amount, "Entry amount")?;

        match entry.description.as_deref() {
            Some(description) => validate_description(description, self.max_description_len)?,
            None => {
                return Err(CoreError::Validation(
                    "Entries require a description".to_string(),
                ))
            }
        }

        if entry.entry_date > chrono::Utc::now().date_naive() {
            return Err(CoreError::Validation(format!(
                "Entry date {} is in the future",
                entry.entry_date
            )));
        }

        Ok(())
    }
}
