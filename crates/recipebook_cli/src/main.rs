//! CLI smoke probe.
//!
//! Opens the database described by `RECIPEBOOK_*` variables and prints the
//! schema version and row counts.

use log::error;
use recipebook_core::{
    core_version, init_logging, AppConfig, AppContext, RecipeRepository, UserRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("recipebook: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(config.log_level, log_dir) {
            eprintln!("recipebook: logging disabled: {err}");
        }
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("recipebook: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("recipebook_core version={}", core_version());
    println!("database={}", config.database.to_uri());

    let ctx = AppContext::new(config)?;
    println!("schema_version={}", ctx.schema_version()?);
    println!("users={}", ctx.users()?.list_users()?.len());
    println!("recipes={}", ctx.recipes()?.list_recipes()?.len());
    Ok(())
}
