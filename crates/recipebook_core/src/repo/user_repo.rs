//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - Users are always loaded together with their recipes.
//! - The stored password hash is carried into the loaded `User` but stays
//!   write-only there.

use super::recipe_repo::{parse_recipe_row, RECIPE_SELECT_SQL};
use super::{ensure_table_ready, RepoError, RepoResult};
use crate::model::recipe::Recipe;
use crate::model::user::{User, USERS_TABLE};
use crate::model::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_COLUMNS: &[&str] = &["id", "username", "password_hash", "image_url", "bio"];

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    password_hash,
    image_url,
    bio
FROM users";

/// Repository interface for user rows.
pub trait UserRepository {
    /// Validates and inserts the user row only, returning its new id.
    ///
    /// Owned recipes are not written here.
    fn insert_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Lists recipes owned by `id`. Unknown users are `NotFound`.
    fn recipes_for_user(&self, id: UserId) -> RepoResult<Vec<Recipe>>;
    /// Checks a candidate password for `id`. Unknown users are `NotFound`.
    fn verify_password(&self, id: UserId, candidate: &str) -> RepoResult<bool>;
    /// Deletes every user row (and, by cascade, their recipes).
    fn delete_all_users(&self) -> RepoResult<usize>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// Rejects connections whose schema is behind or lacks `users` columns.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, USERS_TABLE, USER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                username,
                password_hash,
                image_url,
                bio
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                user.username.as_deref(),
                user.stored_password(),
                user.image_url.as_deref(),
                user.bio.as_deref(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        load_user(self.conn, id)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
                [username],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()?;

        match user {
            Some(user) => Ok(Some(attach_recipes(self.conn, user)?)),
            None => Ok(None),
        }
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        users
            .into_iter()
            .map(|user| attach_recipes(self.conn, user))
            .collect()
    }

    fn recipes_for_user(&self, id: UserId) -> RepoResult<Vec<Recipe>> {
        ensure_user_exists(self.conn, id)?;
        load_recipes_of(self.conn, id)
    }

    fn verify_password(&self, id: UserId, candidate: &str) -> RepoResult<bool> {
        let user = load_user(self.conn, id)?.ok_or(RepoError::NotFound {
            table: USERS_TABLE,
            id,
        })?;
        Ok(user.authenticate(candidate))
    }

    fn delete_all_users(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM users;", [])?)
    }
}

pub(crate) fn load_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| Ok(parse_user_row(row)),
        )
        .optional()?
        .transpose()?;

    match user {
        Some(user) => Ok(Some(attach_recipes(conn, user)?)),
        None => Ok(None),
    }
}

pub(crate) fn ensure_user_exists(conn: &Connection, id: UserId) -> RepoResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(RepoError::NotFound {
            table: USERS_TABLE,
            id,
        })
    }
}

fn attach_recipes(conn: &Connection, mut user: User) -> RepoResult<User> {
    if let Some(id) = user.id {
        user.recipes = load_recipes_of(conn, id)?;
    }
    Ok(user)
}

fn load_recipes_of(conn: &Connection, id: UserId) -> RepoResult<Vec<Recipe>> {
    let mut stmt = conn.prepare(&format!(
        "{RECIPE_SELECT_SQL}
         WHERE user_id = ?1
         ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([id])?;
    let mut recipes = Vec::new();
    while let Some(row) = rows.next()? {
        recipes.push(parse_recipe_row(row)?);
    }
    Ok(recipes)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let mut user = User::default();
    user.id = Some(row.get("id")?);
    user.username = Some(row.get("username")?);
    user.image_url = row.get("image_url")?;
    user.bio = row.get("bio")?;
    user.restore_password(row.get("password_hash")?);
    user.validate().map_err(|err| {
        RepoError::InvalidData(format!("user {:?} fails validation: {err}", user.id))
    })?;
    Ok(user)
}
