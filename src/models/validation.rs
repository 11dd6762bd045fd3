//! Request validation.

use thiserror::Error;

/// Why a request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required {
        /// Field name.
        field: &'static str,
    },
    /// A field exceeds its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },
    /// A field does not have the expected shape.
    #[error("{field} must be {expected}")]
    Format {
        /// Field name.
        field: &'static str,
        /// Human readable description of the accepted format.
        expected: &'static str,
    },
    /// A rule spanning several fields.
    #[error("{0}")]
    Rule(String),
}

/// Validation of a request body before it touches storage.
pub trait Validate {
    /// Checks field formats and cross-field rules.
    ///
    /// # Errors
    /// Returns the first violated rule.
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn required(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    max_len(field, value, max)
}

pub(crate) fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub(crate) fn optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| max_len(field, v, max))
}

/// Exactly `len` ASCII uppercase letters, e.g. ISO country and currency codes.
pub(crate) fn upper_alpha(
    field: &'static str,
    value: &str,
    len: usize,
    expected: &'static str,
) -> Result<(), ValidationError> {
    if value.len() == len && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::Format { field, expected })
    }
}

/// ISO 10383 market identifier code: four uppercase letters or digits.
pub(crate) fn mic(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.len() == 4
        && value
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(ValidationError::Format {
            field,
            expected: "4 uppercase letters or digits",
        })
    }
}

/// `#RRGGBB`.
pub(crate) fn hex_color(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].bytes().all(|b| b.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::Format {
            field,
            expected: "a #RRGGBB color",
        })
    }
}

pub(crate) fn http_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => {
            max_len(field, value, 256)
        }
        _ => Err(ValidationError::Format {
            field,
            expected: "an http or https URL",
        }),
    }
}

pub(crate) fn email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    required(field, value, 254)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::Format {
            field,
            expected: "an email address",
        })
    }
}

/// 3 to 64 characters from `[A-Za-z0-9._-]`.
pub(crate) fn username(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let valid = (3..=64).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::Format {
            field,
            expected: "3 to 64 letters, digits, '.', '_' or '-'",
        })
    }
}

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn password(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::Format {
            field,
            expected: "at least 8 characters",
        });
    }
    max_len(field, value, 128)
}
