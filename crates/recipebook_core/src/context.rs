//! Explicitly constructed application context.
//!
//! # Responsibility
//! - Own one configuration and one migrated connection.
//! - Hand out sessions, repositories and services bound to that connection.
//! - Expose the schema lifecycle (`create_all`, `drop_all`, `reset_tables`).
//!
//! # Invariants
//! - Nothing here is global; two contexts never share state unless they
//!   point at the same database file.

use crate::config::{AppConfig, DatabaseTarget};
use crate::db::migrations;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::repo::recipe_repo::{RecipeRepository, SqliteRecipeRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use crate::service::account_service::AccountService;
use crate::service::recipe_service::RecipeService;
use crate::session::Session;
use log::info;
use rusqlite::Connection;

pub struct AppContext {
    config: AppConfig,
    conn: Connection,
}

impl AppContext {
    /// Opens the configured database and creates the schema.
    pub fn new(config: AppConfig) -> DbResult<Self> {
        let conn = match &config.database {
            DatabaseTarget::Memory => open_db_in_memory()?,
            DatabaseTarget::File(path) => open_db(path)?,
        };
        info!(
            "event=context_init module=context status=ok testing={} database={}",
            config.testing,
            config.database.to_uri()
        );
        Ok(Self { config, conn })
    }

    /// Shorthand for an isolated in-memory testing context.
    pub fn testing() -> DbResult<Self> {
        Self::new(AppConfig::testing())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn session(&mut self) -> Session<'_> {
        Session::new(&mut self.conn)
    }

    pub fn users(&self) -> RepoResult<SqliteUserRepository<'_>> {
        SqliteUserRepository::try_new(&self.conn)
    }

    pub fn recipes(&self) -> RepoResult<SqliteRecipeRepository<'_>> {
        SqliteRecipeRepository::try_new(&self.conn)
    }

    pub fn accounts(&mut self) -> AccountService<'_> {
        AccountService::new(&mut self.conn, self.config.password_cost)
    }

    pub fn recipe_service(&mut self) -> RecipeService<'_> {
        RecipeService::new(&mut self.conn)
    }

    /// Current `PRAGMA user_version`.
    pub fn schema_version(&self) -> DbResult<u32> {
        migrations::current_version(&self.conn)
    }

    /// Creates any missing tables. A no-op on an up-to-date schema.
    pub fn create_all(&mut self) -> DbResult<()> {
        migrations::apply_migrations(&mut self.conn)
    }

    /// Drops every record table.
    pub fn drop_all(&mut self) -> DbResult<()> {
        migrations::drop_all(&mut self.conn)
    }

    /// Deletes every row while keeping the schema.
    pub fn reset_tables(&mut self) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        let (recipes_deleted, users_deleted) = {
            let recipes = SqliteRecipeRepository::try_new(&tx)?.delete_all_recipes()?;
            let users = SqliteUserRepository::try_new(&tx)?.delete_all_users()?;
            (recipes, users)
        };
        tx.commit()?;

        info!(
            "event=tables_reset module=context status=ok recipes_deleted={recipes_deleted} users_deleted={users_deleted}"
        );
        Ok(())
    }
}
