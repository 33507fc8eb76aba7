//! User record and its recipe collection.
//!
//! # Invariants
//! - `username` is present, non-empty and unique across all users when
//!   committed. Uniqueness is enforced by storage.
//! - The password credential can be set and verified, never read.
//! - Every recipe in `recipes` belongs to this user once committed.

use super::credential::{
    AttributeAccessError, CredentialError, PasswordHash, DEFAULT_PASSWORD_COST,
};
use super::recipe::Recipe;
use super::validation::{require_text, ValidationError};
use super::UserId;
use serde::{Deserialize, Serialize};

pub(crate) const USERS_TABLE: &str = "users";

/// An account that owns recipes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by storage on commit.
    pub id: Option<UserId>,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    /// Owned recipes. Order carries no meaning.
    pub recipes: Vec<Recipe>,
    #[serde(skip)]
    password: Option<PasswordHash>,
}

impl User {
    /// Creates an unsaved user with a username and no recipes.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Appends a recipe to this user's collection.
    ///
    /// The recipe's `user_id` is filled in when the user is committed.
    pub fn add_recipe(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }

    /// Returns whether `recipe` is in this user's collection.
    ///
    /// Committed recipes are matched by id; unsaved ones by value.
    pub fn has_recipe(&self, recipe: &Recipe) -> bool {
        match recipe.id {
            Some(id) => self.recipes.iter().any(|owned| owned.id == Some(id)),
            None => self.recipes.iter().any(|owned| owned == recipe),
        }
    }

    /// Hashes and stores a new password with the default bcrypt cost.
    ///
    /// # Errors
    /// Returns `CredentialError` when hashing fails.
    pub fn set_password(&mut self, plaintext: &str) -> Result<(), CredentialError> {
        self.set_password_with_cost(plaintext, DEFAULT_PASSWORD_COST)
    }

    /// Hashes and stores a new password with an explicit bcrypt cost.
    ///
    /// # Errors
    /// Returns `CredentialError` when `cost` is out of range or hashing fails.
    pub fn set_password_with_cost(
        &mut self,
        plaintext: &str,
        cost: u32,
    ) -> Result<(), CredentialError> {
        self.password = Some(PasswordHash::from_plaintext(plaintext, cost)?);
        Ok(())
    }

    /// The password hash is write-only.
    ///
    /// # Errors
    /// Always returns `AttributeAccessError`.
    pub fn password_hash(&self) -> Result<&str, AttributeAccessError> {
        Err(AttributeAccessError {
            record: "User",
            attribute: "password_hash",
        })
    }

    /// Returns whether a password has been set.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Checks `candidate` against the stored password.
    ///
    /// Users without a password never authenticate.
    pub fn authenticate(&self, candidate: &str) -> bool {
        self.password
            .as_ref()
            .is_some_and(|hash| hash.verify(candidate))
    }

    /// Returns whether this user has been committed.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks commit-time field rules of the user row itself.
    ///
    /// Owned recipes are validated separately by the commit path.
    ///
    /// # Errors
    /// `MissingField` / `EmptyField` for `username`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(self.username.as_deref(), USERS_TABLE, "username")?;
        Ok(())
    }

    pub(crate) fn stored_password(&self) -> Option<&str> {
        self.password.as_ref().map(PasswordHash::as_stored)
    }

    pub(crate) fn restore_password(&mut self, stored: Option<String>) {
        self.password = stored.map(PasswordHash::from_stored);
    }
}
