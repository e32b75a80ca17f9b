//! Input validation helpers
//!
//! Request parsing shared by the order, credit and report handlers.
//! Every helper fails with [`AppError::Validation`] so handlers can `?` them
//! before any store call is made.

use rust_decimal::Decimal;
use shared::{OrderDate, OrderKey};

use crate::utils::{AppError, AppResult};

/// Customer names are printed on the receipt; keep them short
pub const MAX_CUSTOMER_NAME_LEN: usize = 100;

/// Menu item / payment method labels
pub const MAX_LABEL_LEN: usize = 200;

/// Largest absolute amount accepted on any money field (one trillion)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Reject amounts whose magnitude exceeds [`MAX_AMOUNT`]
pub fn validate_amount(amount: Decimal, field: &str) -> AppResult<()> {
    if amount.abs() > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds the maximum amount {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

/// Require a query/path value to be present and non-blank
pub fn require<'a>(value: Option<&'a str>, field: &str) -> AppResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::validation(format!("{field} is required"))),
    }
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_date(value: &str, field: &str) -> AppResult<OrderDate> {
    OrderDate::parse(value).map_err(|_| {
        AppError::validation(format!("{field} must be a date in YYYY-MM-DD format"))
    })
}

/// Parse a positive order number
pub fn parse_order_num(value: &str, field: &str) -> AppResult<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::validation(format!(
            "{field} must be a positive integer"
        ))),
    }
}

/// Parse an `orderDate` + `orderNum` pair into a key
pub fn parse_order_key(order_date: Option<&str>, order_num: Option<&str>) -> AppResult<OrderKey> {
    let (Some(date), Some(num)) = (order_date, order_num) else {
        return Err(AppError::validation("Missing orderDate or orderNum"));
    };
    let date = parse_date(require(Some(date), "orderDate")?, "orderDate")?;
    let num = parse_order_num(num, "orderNum")?;
    Ok(OrderKey::new(date, num))
}

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}
