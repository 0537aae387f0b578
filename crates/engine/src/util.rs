//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, Money, ResultEngine};

/// Trim and NFC-normalize a required name; empty names are rejected.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(normalized)
}

/// Trim optional free text, mapping blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

/// Usernames are case-insensitive and may not contain whitespace.
pub(crate) fn normalize_username(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(
            "username must not be empty".to_string(),
        ));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EngineError::InvalidName(
            "username must not contain spaces".to_string(),
        ));
    }
    Ok(trimmed.to_lowercase())
}

/// Posting amounts are magnitudes; the operation decides the sign.
pub(crate) fn require_positive_amount(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
    }
    require_within_limit(amount)
}

/// Opening balances may be negative but share the posting limit.
pub(crate) fn require_within_limit(amount: Money) -> ResultEngine<()> {
    if !amount.within_limit() {
        return Err(EngineError::InvalidAmount(format!(
            "amount must not exceed {}",
            Money::LIMIT
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed_and_composed() {
        assert_eq!(
            normalize_required_name("  Asha  ", "customer").unwrap(),
            "Asha"
        );
        // "e" + combining acute composes to a single code point.
        assert_eq!(
            normalize_required_name("Re\u{301}ne", "customer").unwrap(),
            "R\u{e9}ne"
        );
        assert_eq!(
            normalize_required_name("   ", "customer"),
            Err(EngineError::InvalidName(
                "customer name must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" 98450 ")),
            Some("98450".to_string())
        );
    }

    #[test]
    fn username_rules() {
        assert_eq!(normalize_username(" Ravi ").unwrap(), "ravi");
        assert!(normalize_username("ravi kumar").is_err());
        assert!(normalize_username("").is_err());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(require_positive_amount(Money::new(1)).is_ok());
        assert!(require_positive_amount(Money::ZERO).is_err());
        assert!(require_positive_amount(Money::new(-5)).is_err());
        assert!(require_positive_amount(Money::LIMIT).is_ok());
        assert_eq!(
            require_positive_amount(Money::new(i64::MAX)),
            Err(EngineError::InvalidAmount(
                "amount must not exceed 100000000000.00".to_string()
            ))
        );
    }

    #[test]
    fn opening_balance_limit_is_symmetric() {
        assert!(require_within_limit(-Money::LIMIT).is_ok());
        assert!(require_within_limit(Money::new(i64::MIN)).is_err());
        assert!(require_within_limit(Money::new(-10_000_000_000_001)).is_err());
    }
}
