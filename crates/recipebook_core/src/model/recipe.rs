//! Recipe record.
//!
//! # Invariants
//! - `title` is present and non-empty when committed.
//! - `instructions` holds at least `MIN_INSTRUCTIONS_CHARS` characters when
//!   committed. Length is counted in characters, not bytes, and NUL is
//!   rejected so the count agrees with SQLite's `length()`.
//! - `user_id` points at an existing user row or is `None`.

use super::validation::{require_text, ValidationError};
use super::{RecipeId, UserId};
use serde::{Deserialize, Serialize};

/// Character floor for `Recipe::instructions`.
pub const MIN_INSTRUCTIONS_CHARS: usize = 50;

pub(crate) const RECIPES_TABLE: &str = "recipes";

/// A recipe, optionally owned by one user.
///
/// Required fields are `Option` so that an incomplete recipe can be built
/// and handed to a session; the violation surfaces at commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Assigned by storage on commit.
    pub id: Option<RecipeId>,
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i64>,
    /// Owning user. Filled in on commit when the recipe is committed
    /// through `User::recipes`.
    pub user_id: Option<UserId>,
}

impl Recipe {
    /// Creates an unsaved recipe with title and instructions.
    pub fn new(title: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            instructions: Some(instructions.into()),
            ..Self::default()
        }
    }

    /// Sets the expected preparation time.
    pub fn with_minutes(mut self, minutes: i64) -> Self {
        self.minutes_to_complete = Some(minutes);
        self
    }

    /// Sets the owning user of a standalone recipe.
    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Returns whether this recipe has been committed.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks commit-time field rules.
    ///
    /// # Errors
    /// - `MissingField` / `EmptyField` for `title`.
    /// - `MissingField` for `instructions`, `ContainsNul` when it holds a NUL
    ///   character, `TooShort` below the floor.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(self.title.as_deref(), RECIPES_TABLE, "title")?;

        let instructions = self
            .instructions
            .as_deref()
            .ok_or(ValidationError::MissingField {
                table: RECIPES_TABLE,
                field: "instructions",
            })?;
        if instructions.contains('\0') {
            return Err(ValidationError::ContainsNul {
                table: RECIPES_TABLE,
                field: "instructions",
            });
        }
        let actual_chars = instructions.chars().count();
        if actual_chars < MIN_INSTRUCTIONS_CHARS {
            return Err(ValidationError::TooShort {
                table: RECIPES_TABLE,
                field: "instructions",
                min_chars: MIN_INSTRUCTIONS_CHARS,
                actual_chars,
            });
        }

        Ok(())
    }
}
