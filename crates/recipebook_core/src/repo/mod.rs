//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL for `users` and `recipes` inside the persistence boundary.
//! - Turn SQLite constraint failures and model rule violations into one
//!   `RepoError::Constraint` kind.
//!
//! # Invariants
//! - Write paths call `validate()` on the record before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories only wrap connections whose schema is fully migrated.

pub mod recipe_repo;
pub mod user_repo;

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::{ffi, Connection, ErrorCode};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Schema rule family a constraint violation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    NotNull,
    Unique,
    Check,
    ForeignKey,
    Other,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotNull => "not_null",
            Self::Unique => "unique",
            Self::Check => "check",
            Self::ForeignKey => "foreign_key",
            Self::Other => "other",
        }
    }
}

/// A record broke a declared schema rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    pub detail: String,
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} constraint violated: {}",
            self.kind.as_str(),
            self.detail
        )
    }
}

impl From<ValidationError> for ConstraintViolation {
    fn from(value: ValidationError) -> Self {
        let kind = match value {
            ValidationError::MissingField { .. } => ConstraintKind::NotNull,
            ValidationError::EmptyField { .. }
            | ValidationError::TooShort { .. }
            | ValidationError::ContainsNul { .. } => ConstraintKind::Check,
        };
        Self {
            kind,
            detail: value.to_string(),
        }
    }
}

/// Repository error for record persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Constraint(ConstraintViolation),
    Db(DbError),
    NotFound {
        table: &'static str,
        id: i64,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether this error is a schema-rule violation.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }

    /// Returns the violation details when this is a constraint error.
    pub fn constraint(&self) -> Option<&ConstraintViolation> {
        match self {
            Self::Constraint(violation) => Some(violation),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constraint(violation) => write!(f, "{violation}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Constraint(value.into())
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match constraint_kind(&value) {
            Some(kind) => {
                let detail = match &value {
                    rusqlite::Error::SqliteFailure(_, Some(message)) => message.clone(),
                    other => other.to_string(),
                };
                Self::Constraint(ConstraintViolation { kind, detail })
            }
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    let rusqlite::Error::SqliteFailure(failure, _) = err else {
        return None;
    };
    if failure.code != ErrorCode::ConstraintViolation {
        return None;
    }
    Some(match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::Unique,
        ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
        _ => ConstraintKind::Other,
    })
}

/// Verifies schema version plus table/column presence for one table.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let actual_version = current_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    if present.is_empty() {
        return Err(RepoError::MissingRequiredTable(table));
    }

    if let Some(&column) = columns.iter().find(|column| !present.contains(**column)) {
        return Err(RepoError::MissingRequiredColumn { table, column });
    }

    Ok(())
}
