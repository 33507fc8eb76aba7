//! Write-only password credential.
//!
//! # Responsibility
//! - Hash plaintext passwords with bcrypt before they reach a record.
//! - Expose `verify` and nothing that returns the stored secret.
//!
//! # Invariants
//! - Plaintext is never stored.
//! - `Debug` output never includes the hash.
//! - Only storage code inside this crate can read the hash back.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Work factor used by `User::set_password`.
pub const DEFAULT_PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;
/// Smallest work factor bcrypt accepts. Used by testing configs.
pub const MIN_PASSWORD_COST: u32 = 4;
/// Largest work factor bcrypt accepts.
pub const MAX_PASSWORD_COST: u32 = 31;

/// Failure while hashing a new password.
#[derive(Debug)]
pub enum CredentialError {
    InvalidCost(u32),
    Hash(bcrypt::BcryptError),
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCost(cost) => write!(
                f,
                "password cost {cost} is outside {MIN_PASSWORD_COST}..={MAX_PASSWORD_COST}"
            ),
            Self::Hash(err) => write!(f, "password hashing failed: {err}"),
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCost(_) => None,
            Self::Hash(err) => Some(err),
        }
    }
}

impl From<bcrypt::BcryptError> for CredentialError {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::Hash(value)
    }
}

/// Raised when code reads an attribute that is intentionally not readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAccessError {
    pub record: &'static str,
    pub attribute: &'static str,
}

impl Display for AttributeAccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} is write-only and cannot be read",
            self.record, self.attribute
        )
    }
}

impl Error for AttributeAccessError {}

/// Bcrypt hash of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes `plaintext` with the given bcrypt work factor.
    ///
    /// # Errors
    /// - `InvalidCost` when `cost` is outside bcrypt's accepted range.
    /// - `Hash` when the bcrypt backend fails.
    pub fn from_plaintext(plaintext: &str, cost: u32) -> Result<Self, CredentialError> {
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&cost) {
            return Err(CredentialError::InvalidCost(cost));
        }
        Ok(Self(bcrypt::hash(plaintext, cost)?))
    }

    /// Returns whether `candidate` matches this hash.
    ///
    /// A malformed stored hash never matches.
    pub fn verify(&self, candidate: &str) -> bool {
        bcrypt::verify(candidate, &self.0).unwrap_or(false)
    }

    pub(crate) fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    pub(crate) fn as_stored(&self) -> &str {
        &self.0
    }
}

impl Debug for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}
