//! Input validation helpers.
//!
//! Messages are user-facing and in Vietnamese, matching the storefront's
//! locale; API handlers pass them through verbatim.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

// Vietnamese mobile numbers: leading 0 or +84, then a 3/5/7/8/9 prefix and
// eight more digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0|\+84)(3|5|7|8|9)\d{8}$").expect("valid phone regex"));

/// Validate an email address.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the address is empty or malformed.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::new("Vui lòng nhập email"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::new("Email không hợp lệ"));
    }
    Ok(())
}

/// Validate a password: non-empty and at least 6 characters.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the failed rule.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("Vui lòng nhập mật khẩu"));
    }
    if password.chars().count() < 6 {
        return Err(ValidationError::new("Mật khẩu phải có ít nhất 6 ký tự"));
    }
    Ok(())
}

/// Validate a Vietnamese mobile phone number (`0…` or `+84…`).
///
/// # Errors
///
/// Returns a [`ValidationError`] when the number is empty or malformed.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::new("Vui lòng nhập số điện thoại"));
    }
    if !PHONE_RE.is_match(phone) {
        return Err(ValidationError::new("Số điện thoại không hợp lệ"));
    }
    Ok(())
}

/// Validate that a numeric value is finite and non-negative.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the value is NaN, infinite, or negative.
pub fn validate_number(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new("Giá trị phải là một số hợp lệ"));
    }
    if value < 0.0 {
        return Err(ValidationError::new("Giá trị không được âm"));
    }
    Ok(())
}

/// Validate that a required text field is present after trimming.
///
/// `field` is the user-facing field label, interpolated into the message.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the missing field.
pub fn validate_required(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("Vui lòng nhập {field}")));
    }
    Ok(())
}
