//! Domain records persisted by the recipe book.
//!
//! # Responsibility
//! - Define `Recipe` and `User` as plain in-memory records.
//! - Own field-level rules that must hold when a record is committed.
//!
//! # Invariants
//! - Records are never validated at construction; `validate()` is called on
//!   the commit path only.
//! - Identifiers stay `None` until a session commit succeeds.
//! - The user password credential is write-only.

pub mod credential;
pub mod recipe;
pub mod user;
pub mod validation;

/// Database-assigned identifier of a user row.
pub type UserId = i64;

/// Database-assigned identifier of a recipe row.
pub type RecipeId = i64;
