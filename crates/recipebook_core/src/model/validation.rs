//! Field-level rule violations detected before SQL is issued.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rule violated by a record about to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was never set.
    MissingField {
        table: &'static str,
        field: &'static str,
    },
    /// A required text field was set to an empty string.
    EmptyField {
        table: &'static str,
        field: &'static str,
    },
    /// A text field is shorter than its character floor.
    TooShort {
        table: &'static str,
        field: &'static str,
        min_chars: usize,
        actual_chars: usize,
    },
    /// A text field holds a NUL character, which SQLite text functions
    /// treat as the end of the string.
    ContainsNul {
        table: &'static str,
        field: &'static str,
    },
}

impl ValidationError {
    /// Table the offending record belongs to.
    pub fn table(&self) -> &'static str {
        match self {
            Self::MissingField { table, .. }
            | Self::EmptyField { table, .. }
            | Self::TooShort { table, .. }
            | Self::ContainsNul { table, .. } => table,
        }
    }

    /// Column name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field, .. }
            | Self::EmptyField { field, .. }
            | Self::TooShort { field, .. }
            | Self::ContainsNul { field, .. } => field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { table, field } => write!(f, "{table}.{field} is required"),
            Self::EmptyField { table, field } => write!(f, "{table}.{field} must not be empty"),
            Self::TooShort {
                table,
                field,
                min_chars,
                actual_chars,
            } => write!(
                f,
                "{table}.{field} must be at least {min_chars} characters (got {actual_chars})"
            ),
            Self::ContainsNul { table, field } => {
                write!(f, "{table}.{field} must not contain NUL characters")
            }
        }
    }
}

impl Error for ValidationError {}

/// Checks a required, non-empty text field.
pub(crate) fn require_text<'a>(
    value: Option<&'a str>,
    table: &'static str,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match value {
        None => Err(ValidationError::MissingField { table, field }),
        Some("") => Err(ValidationError::EmptyField { table, field }),
        Some(text) => Ok(text),
    }
}
