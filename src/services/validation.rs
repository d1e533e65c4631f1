use std::sync::LazyLock;

use regex::Regex;

use crate::entities::rating;
use crate::error::{AppError, AppResult};

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap_or_else(|e| panic!("invalid username regex: {e}"))
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|e| panic!("invalid email regex: {e}"))
});

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn username(value: &str) -> AppResult<String> {
    let value = value.trim();
    if !USERNAME_RE.is_match(value) {
        return Err(AppError::validation(
            "Username must be 3-32 characters of letters, digits, '_', '.' or '-'",
        ));
    }
    Ok(value.to_string())
}

/// Trimmed, lowercased email address.
pub fn email(value: &str) -> AppResult<String> {
    let value = value.trim().to_lowercase();
    if value.len() > 254 || !EMAIL_RE.is_match(&value) {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(value)
}

pub fn password(value: &str) -> AppResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn rating_value(value: i32) -> AppResult<()> {
    if !(rating::MIN_VALUE..=rating::MAX_VALUE).contains(&value) {
        return Err(AppError::validation(format!(
            "Rating must be between {} and {}",
            rating::MIN_VALUE,
            rating::MAX_VALUE
        )));
    }
    Ok(())
}

/// Trimmed, non-empty text for a required field.
pub fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert_eq!(username("  dj_mara.01 ").unwrap(), "dj_mara.01");
        assert!(username("ab").is_err());
        assert!(username("has space").is_err());
        assert!(username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(email(" Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(email("not-an-email").is_err());
        assert!(email("a@b").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(password("1234567").is_err());
        assert!(password("12345678").is_ok());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(rating_value(0).is_err());
        assert!(rating_value(1).is_ok());
        assert!(rating_value(5).is_ok());
        assert!(rating_value(6).is_err());
    }
}
