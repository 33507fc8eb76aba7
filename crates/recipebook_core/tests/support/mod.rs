#![allow(dead_code)]

use recipebook_core::{AppConfig, AppContext, DatabaseTarget};
use std::path::PathBuf;
use tempfile::TempDir;

/// Bcrypt cost used by tests that hash passwords.
pub const TEST_PASSWORD_COST: u32 = 4;

pub const SHED_HAM_INSTRUCTIONS: &str = "Or kind rest bred with am shed then. In raptures \
    building an bringing be. Elderly is detract tedious assured private so to visited. Do \
    travelling companions contrasted it. Mistress strongly remember up to. Ham him compass \
    you proceed calling detract. Better of always missed we person mr. September smallness \
    northward situation few her certainty something.";

pub const PARTY_HAM_INSTRUCTIONS: &str = "As am hastily invited settled at limited civilly \
    fortune me. Really spring in extent an by. Judge but built gay party world. Of so am he \
    remember although required. Bachelor unpacked be advanced at. Confined in declared \
    marianne is vicinity.";

pub const LIZ_IMAGE_URL: &str =
    "https://prod-images.tcm.com/Master-Profile-Images/ElizabethTaylor.jpg";

pub const LIZ_BIO: &str = "Dame Elizabeth Rosemond Taylor DBE (February 27, 1932 - March 23, \
    2011) was a British-American actress. She began her career as a child actress in the early \
    1940s and was one of the most popular stars of classical Hollywood cinema in the 1950s. She \
    then became the world's highest paid movie star in the 1960s, remaining a well-known public \
    figure for the rest of her life. In 1999, the American Film Institute named her the \
    seventh-greatest female screen legend of Classic Hollywood cinema.";

/// Isolated testing context whose schema is created on construction and
/// dropped when the fixture goes out of scope.
pub struct ScopedSchema {
    ctx: AppContext,
    _dir: Option<TempDir>,
}

impl ScopedSchema {
    /// In-memory database private to this fixture.
    pub fn in_memory() -> Self {
        Self {
            ctx: AppContext::testing().unwrap(),
            _dir: None,
        }
    }

    /// File database inside a fresh temporary directory.
    pub fn on_disk() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::testing()
            .with_database(DatabaseTarget::File(dir.path().join("app_test.db")));
        Self {
            ctx: AppContext::new(config).unwrap(),
            _dir: Some(dir),
        }
    }

    pub fn ctx(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    /// Empties both tables before a test runs.
    pub fn fresh(&mut self) -> &mut AppContext {
        self.ctx.reset_tables().unwrap();
        &mut self.ctx
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        match &self.ctx.config().database {
            DatabaseTarget::File(path) => Some(path.clone()),
            DatabaseTarget::Memory => None,
        }
    }
}

impl Drop for ScopedSchema {
    fn drop(&mut self) {
        let _ = self.ctx.drop_all();
    }
}
