//! Field-level input checks
//!
//! Column widths mirror the persisted layout so that oversized input is
//! rejected with a validation error instead of being truncated by storage.

use crate::error::{CustomsError, Result};

/// Maximum width of regulatory reference numbers (declaration, receipt, bon, NIF)
pub const REFERENCE_MAX: usize = 30;
/// Maximum width of a liquidation bulletin reference
pub const BULLETIN_MAX: usize = 20;
/// Maximum width of free-text fields (names, offices, addresses)
pub const TEXT_MAX: usize = 255;

/// Trim a required field and check it is non-empty and within `max` characters
pub fn required(field: &str, value: &str, max: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CustomsError::Validation(format!("{} is required", field)));
    }
    bounded(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Trim an optional field; blank input becomes `None`
pub fn optional(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            bounded(field, trimmed, max)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

/// Check an e-mail address has a non-empty local part and a dotted domain
///
/// Addresses are lowercased, so uniqueness holds regardless of case.
pub fn email(field: &str, value: &str) -> Result<String> {
    let value = required(field, value, TEXT_MAX)?.to_lowercase();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(CustomsError::Validation(format!(
            "{} '{}' is not a valid e-mail address",
            field, value
        )));
    }
    Ok(value)
}

fn bounded(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(CustomsError::Validation(format!(
            "{} must be at most {} characters (got {})",
            field, max, len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("number", "  D-1 ", REFERENCE_MAX).unwrap(), "D-1");
        assert!(required("number", "   ", REFERENCE_MAX).is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        let bulletin = "é".repeat(BULLETIN_MAX);
        assert!(required("bulletin", &bulletin, BULLETIN_MAX).is_ok());
        let too_long = "x".repeat(BULLETIN_MAX + 1);
        let err = required("bulletin", &too_long, BULLETIN_MAX).unwrap_err();
        assert!(err.to_string().contains("at most 20"));
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional("address", Some("  "), TEXT_MAX).unwrap(), None);
        assert_eq!(optional("address", None, TEXT_MAX).unwrap(), None);
        assert_eq!(
            optional("address", Some(" Rue 12 "), TEXT_MAX).unwrap(),
            Some("Rue 12".to_string())
        );
    }

    #[test]
    fn test_email() {
        assert!(email("email", "awa@transit.sn").is_ok());
        assert!(email("email", "awa.transit.sn").is_err());
        assert!(email("email", "@transit.sn").is_err());
        assert!(email("email", "awa@").is_err());
        assert!(email("email", "awa@@transit.sn").is_err());
        assert!(email("email", "a wa@transit.sn").is_err());
        assert!(email("email", "awa@localhost").is_err());
    }

    #[test]
    fn test_email_is_lowercased() {
        assert_eq!(email("email", " ÉLODIE@Transit.SN ").unwrap(), "élodie@transit.sn");
    }
}
