//! Recipe repository contract and SQLite implementation.

use super::user_repo::load_user;
use super::{ensure_table_ready, RepoError, RepoResult};
use crate::model::recipe::{Recipe, RECIPES_TABLE};
use crate::model::user::User;
use crate::model::{RecipeId, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const RECIPE_COLUMNS: &[&str] = &[
    "id",
    "title",
    "instructions",
    "minutes_to_complete",
    "user_id",
];

pub(crate) const RECIPE_SELECT_SQL: &str = "SELECT
    id,
    title,
    instructions,
    minutes_to_complete,
    user_id
FROM recipes";

/// Repository interface for recipe rows.
pub trait RecipeRepository {
    /// Validates and inserts one recipe, returning its new id.
    ///
    /// `owner` takes precedence over `recipe.user_id` when set.
    fn insert_recipe(&self, recipe: &Recipe, owner: Option<UserId>) -> RepoResult<RecipeId>;
    fn get_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>>;
    /// Returns the lowest-id recipe with exactly this title.
    fn find_by_title(&self, title: &str) -> RepoResult<Option<Recipe>>;
    fn list_recipes(&self) -> RepoResult<Vec<Recipe>>;
    /// Resolves the owning user of a recipe.
    ///
    /// Returns `NotFound` for an unknown recipe and `Ok(None)` for an
    /// unowned one.
    fn owner_of(&self, id: RecipeId) -> RepoResult<Option<User>>;
    /// Points a committed recipe at a new owner.
    ///
    /// Returns `NotFound` for an unknown recipe; an unknown owner surfaces
    /// as a foreign-key constraint violation.
    fn assign_owner(&self, id: RecipeId, user_id: UserId) -> RepoResult<()>;
    /// Deletes every recipe row and returns how many were removed.
    fn delete_all_recipes(&self) -> RepoResult<usize>;
}

/// SQLite-backed recipe repository.
pub struct SqliteRecipeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecipeRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// Rejects connections whose schema is behind or lacks `recipes` columns.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, RECIPES_TABLE, RECIPE_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl RecipeRepository for SqliteRecipeRepository<'_> {
    fn insert_recipe(&self, recipe: &Recipe, owner: Option<UserId>) -> RepoResult<RecipeId> {
        recipe.validate()?;

        self.conn.execute(
            "INSERT INTO recipes (
                title,
                instructions,
                minutes_to_complete,
                user_id
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                recipe.title.as_deref(),
                recipe.instructions.as_deref(),
                recipe.minutes_to_complete,
                owner.or(recipe.user_id),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>> {
        load_recipe(self.conn, id)
    }

    fn find_by_title(&self, title: &str) -> RepoResult<Option<Recipe>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECIPE_SELECT_SQL}
             WHERE title = ?1
             ORDER BY id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([title])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_recipe_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_recipes(&self) -> RepoResult<Vec<Recipe>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECIPE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut recipes = Vec::new();
        while let Some(row) = rows.next()? {
            recipes.push(parse_recipe_row(row)?);
        }
        Ok(recipes)
    }

    fn owner_of(&self, id: RecipeId) -> RepoResult<Option<User>> {
        let recipe = load_recipe(self.conn, id)?.ok_or(RepoError::NotFound {
            table: RECIPES_TABLE,
            id,
        })?;
        let Some(user_id) = recipe.user_id else {
            return Ok(None);
        };

        let owner = load_user(self.conn, user_id)?;
        if owner.is_none() {
            return Err(RepoError::InvalidData(format!(
                "recipes.user_id {user_id} of recipe {id} points at a missing user"
            )));
        }
        Ok(owner)
    }

    fn assign_owner(&self, id: RecipeId, user_id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE recipes SET user_id = ?2 WHERE id = ?1;",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: RECIPES_TABLE,
                id,
            });
        }
        Ok(())
    }

    fn delete_all_recipes(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM recipes;", [])?)
    }
}

fn load_recipe(conn: &Connection, id: RecipeId) -> RepoResult<Option<Recipe>> {
    let recipe = conn
        .query_row(
            &format!("{RECIPE_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| Ok(parse_recipe_row(row)),
        )
        .optional()?;
    recipe.transpose()
}

pub(crate) fn parse_recipe_row(row: &Row<'_>) -> RepoResult<Recipe> {
    let recipe = Recipe {
        id: Some(row.get("id")?),
        title: Some(row.get("title")?),
        instructions: Some(row.get("instructions")?),
        minutes_to_complete: row.get("minutes_to_complete")?,
        user_id: row.get("user_id")?,
    };
    recipe.validate().map_err(|err| {
        RepoError::InvalidData(format!("recipe {:?} fails validation: {err}", recipe.id))
    })?;
    Ok(recipe)
}
