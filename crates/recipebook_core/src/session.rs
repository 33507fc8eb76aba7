//! Unit-of-work for committing records.
//!
//! # Responsibility
//! - Collect borrowed records, then write them in one transaction.
//! - Hand database-assigned ids back to the records after commit.
//!
//! # Invariants
//! - Validation and id assignment happen in `commit`, never in `add_*`.
//! - A failed commit rolls back every write and leaves every record's `id`
//!   (and owned recipes' `user_id`) untouched.
//! - Records that already carry an id are not inserted again; new recipes in
//!   a committed user's collection still are.
//! - A committed recipe moved into another user's collection has its stored
//!   owner rewritten in the same transaction.

use crate::model::recipe::Recipe;
use crate::model::user::User;
use crate::model::{RecipeId, UserId};
use crate::repo::recipe_repo::{RecipeRepository, SqliteRecipeRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use log::{info, warn};
use rusqlite::Connection;
use std::time::Instant;

enum Pending<'s> {
    User(&'s mut User),
    Recipe(&'s mut Recipe),
}

enum RecipeWrite {
    Inserted(RecipeId),
    Reassigned,
    Unchanged,
}

enum Assigned {
    User {
        user_id: UserId,
        recipe_writes: Vec<RecipeWrite>,
    },
    Recipe(RecipeWrite),
}

/// Counts of rows written by one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub users_inserted: usize,
    pub recipes_inserted: usize,
    /// Committed recipes whose stored owner changed.
    pub recipes_reassigned: usize,
}

/// Pending records bound to one connection.
pub struct Session<'s> {
    conn: &'s mut Connection,
    pending: Vec<Pending<'s>>,
}

impl<'s> Session<'s> {
    pub fn new(conn: &'s mut Connection) -> Self {
        Self {
            conn,
            pending: Vec::new(),
        }
    }

    /// Registers a user, together with its recipe collection.
    pub fn add_user(&mut self, user: &'s mut User) {
        self.pending.push(Pending::User(user));
    }

    /// Registers several users to be committed together.
    pub fn add_all_users(&mut self, users: impl IntoIterator<Item = &'s mut User>) {
        self.pending.extend(users.into_iter().map(Pending::User));
    }

    /// Registers a standalone recipe.
    pub fn add_recipe(&mut self, recipe: &'s mut Recipe) {
        self.pending.push(Pending::Recipe(recipe));
    }

    /// Number of records registered so far.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Discards all pending records without touching storage.
    pub fn rollback(self) {
        info!(
            "event=session_rollback module=session status=ok pending={}",
            self.pending.len()
        );
    }

    /// Validates and writes every pending record in one transaction.
    ///
    /// # Errors
    /// - `RepoError::Constraint` when a record breaks a field rule or a
    ///   schema constraint (including username uniqueness).
    /// - Other `RepoError` variants for storage failures.
    pub fn commit(mut self) -> RepoResult<CommitSummary> {
        let started_at = Instant::now();
        let pending = self.pending.len();
        info!("event=session_commit module=session status=start pending={pending}");

        let assigned = match self.write_pending() {
            Ok(assigned) => assigned,
            Err(err) => {
                warn!(
                    "event=session_commit module=session status=error pending={pending} duration_ms={} constraint={} error={err}",
                    started_at.elapsed().as_millis(),
                    err.is_constraint_violation()
                );
                return Err(err);
            }
        };

        let summary = apply_assigned(&mut self.pending, assigned);
        info!(
            "event=session_commit module=session status=ok users_inserted={} recipes_inserted={} recipes_reassigned={} duration_ms={}",
            summary.users_inserted,
            summary.recipes_inserted,
            summary.recipes_reassigned,
            started_at.elapsed().as_millis()
        );
        Ok(summary)
    }

    fn write_pending(&mut self) -> RepoResult<Vec<Assigned>> {
        let tx = self.conn.transaction()?;
        let mut assigned = Vec::with_capacity(self.pending.len());
        {
            let users = SqliteUserRepository::try_new(&tx)?;
            let recipes = SqliteRecipeRepository::try_new(&tx)?;

            for record in &self.pending {
                match record {
                    Pending::User(user) => {
                        let user_id = match user.id {
                            Some(id) => id,
                            None => users.insert_user(user)?,
                        };
                        let recipe_writes = user
                            .recipes
                            .iter()
                            .map(|recipe| write_owned_recipe(&recipes, recipe, user_id))
                            .collect::<RepoResult<Vec<_>>>()?;
                        assigned.push(Assigned::User {
                            user_id,
                            recipe_writes,
                        });
                    }
                    Pending::Recipe(recipe) => {
                        let write = if recipe.is_persisted() {
                            RecipeWrite::Unchanged
                        } else {
                            RecipeWrite::Inserted(recipes.insert_recipe(recipe, None)?)
                        };
                        assigned.push(Assigned::Recipe(write));
                    }
                }
            }
        }
        tx.commit()?;
        Ok(assigned)
    }
}

fn write_owned_recipe(
    recipes: &SqliteRecipeRepository<'_>,
    recipe: &Recipe,
    owner: UserId,
) -> RepoResult<RecipeWrite> {
    match recipe.id {
        None => recipes.insert_recipe(recipe, Some(owner)).map(RecipeWrite::Inserted),
        Some(id) if recipe.user_id != Some(owner) => {
            recipes.assign_owner(id, owner)?;
            Ok(RecipeWrite::Reassigned)
        }
        Some(_) => Ok(RecipeWrite::Unchanged),
    }
}

fn apply_assigned(pending: &mut [Pending<'_>], assigned: Vec<Assigned>) -> CommitSummary {
    let mut summary = CommitSummary::default();
    for (record, ids) in pending.iter_mut().zip(assigned) {
        match (record, ids) {
            (
                Pending::User(user),
                Assigned::User {
                    user_id,
                    recipe_writes,
                },
            ) => {
                if user.id.is_none() {
                    user.id = Some(user_id);
                    summary.users_inserted += 1;
                }
                for (recipe, write) in user.recipes.iter_mut().zip(recipe_writes) {
                    match write {
                        RecipeWrite::Inserted(recipe_id) => {
                            recipe.id = Some(recipe_id);
                            recipe.user_id = Some(user_id);
                            summary.recipes_inserted += 1;
                        }
                        RecipeWrite::Reassigned => {
                            recipe.user_id = Some(user_id);
                            summary.recipes_reassigned += 1;
                        }
                        RecipeWrite::Unchanged => {}
                    }
                }
            }
            (Pending::Recipe(recipe), Assigned::Recipe(RecipeWrite::Inserted(recipe_id))) => {
                recipe.id = Some(recipe_id);
                summary.recipes_inserted += 1;
            }
            _ => {}
        }
    }
    summary
}
