//! Persistence layer of the recipe book.
//!
//! Recipes and users live in SQLite. Field rules are checked when a session
//! commits, and every rule violation surfaces as `RepoError::Constraint`.

pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{AppConfig, ConfigError, DatabaseTarget};
pub use context::AppContext;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::credential::{AttributeAccessError, CredentialError, PasswordHash};
pub use model::recipe::{Recipe, MIN_INSTRUCTIONS_CHARS};
pub use model::user::User;
pub use model::validation::ValidationError;
pub use model::{RecipeId, UserId};
pub use repo::recipe_repo::{RecipeRepository, SqliteRecipeRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{ConstraintKind, ConstraintViolation, RepoError, RepoResult};
pub use service::account_service::{AccountService, AccountServiceError, SignUpRequest};
pub use service::recipe_service::{RecipeService, RecipeServiceError};
pub use session::{CommitSummary, Session};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
