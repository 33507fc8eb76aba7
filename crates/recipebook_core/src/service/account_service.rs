//! Account sign-up and authentication.
//!
//! # Invariants
//! - Passwords are hashed before any record leaves this service.
//! - Unknown usernames and wrong passwords are indistinguishable to callers.

use crate::model::credential::CredentialError;
use crate::model::user::User;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{ConstraintKind, RepoError};
use crate::session::Session;
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AccountServiceError {
    /// Another user already holds this username.
    UsernameTaken(String),
    /// Username unknown or password mismatch.
    InvalidCredentials,
    Credential(CredentialError),
    Repo(RepoError),
}

impl Display for AccountServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameTaken(username) => write!(f, "username `{username}` is already taken"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Credential(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Credential(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CredentialError> for AccountServiceError {
    fn from(value: CredentialError) -> Self {
        Self::Credential(value)
    }
}

impl From<RepoError> for AccountServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

pub struct AccountService<'conn> {
    conn: &'conn mut Connection,
    password_cost: u32,
}

impl<'conn> AccountService<'conn> {
    pub fn new(conn: &'conn mut Connection, password_cost: u32) -> Self {
        Self {
            conn,
            password_cost,
        }
    }

    /// Creates and commits a new user with a hashed password.
    ///
    /// # Errors
    /// - `UsernameTaken` when the username already exists.
    /// - `Repo(Constraint)` for other field rule violations.
    pub fn sign_up(&mut self, request: SignUpRequest) -> Result<User, AccountServiceError> {
        let mut user = User::new(request.username);
        user.image_url = request.image_url;
        user.bio = request.bio;
        user.set_password_with_cost(&request.password, self.password_cost)?;

        let mut session = Session::new(&mut *self.conn);
        session.add_user(&mut user);
        match session.commit() {
            Ok(_) => {}
            Err(RepoError::Constraint(violation)) if violation.kind == ConstraintKind::Unique => {
                return Err(AccountServiceError::UsernameTaken(
                    user.username.unwrap_or_default(),
                ));
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            "event=sign_up module=account status=ok user_id={}",
            user.id.unwrap_or_default()
        );
        Ok(user)
    }

    /// Returns the user when `candidate` matches their password.
    ///
    /// # Errors
    /// `InvalidCredentials` for unknown usernames and wrong passwords.
    pub fn authenticate(&self, username: &str, candidate: &str) -> Result<User, AccountServiceError> {
        let users = SqliteUserRepository::try_new(self.conn)?;
        match users.find_by_username(username)? {
            Some(user) if user.authenticate(candidate) => {
                info!(
                    "event=authenticate module=account status=ok user_id={}",
                    user.id.unwrap_or_default()
                );
                Ok(user)
            }
            _ => {
                warn!("event=authenticate module=account status=rejected");
                Err(AccountServiceError::InvalidCredentials)
            }
        }
    }
}
