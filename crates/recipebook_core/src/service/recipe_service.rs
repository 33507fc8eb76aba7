//! Recipe publishing for existing users.

use crate::model::recipe::Recipe;
use crate::model::user::USERS_TABLE;
use crate::model::UserId;
use crate::repo::user_repo::{ensure_user_exists, SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use crate::session::Session;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum RecipeServiceError {
    UserNotFound(UserId),
    Repo(RepoError),
}

impl Display for RecipeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecipeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UserNotFound(_) => None,
        }
    }
}

impl From<RepoError> for RecipeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { table, id } if table == USERS_TABLE => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct RecipeService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> RecipeService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Commits `recipe` as owned by `owner_id` and returns it with its id.
    pub fn publish(&mut self, owner_id: UserId, recipe: Recipe) -> Result<Recipe, RecipeServiceError> {
        ensure_user_exists(self.conn, owner_id)?;

        let mut recipe = recipe.owned_by(owner_id);
        let mut session = Session::new(&mut *self.conn);
        session.add_recipe(&mut recipe);
        session.commit()?;
        Ok(recipe)
    }

    /// Lists recipes owned by `owner_id`.
    pub fn list_for(&self, owner_id: UserId) -> Result<Vec<Recipe>, RecipeServiceError> {
        let users = SqliteUserRepository::try_new(self.conn)?;
        Ok(users.recipes_for_user(owner_id)?)
    }
}
