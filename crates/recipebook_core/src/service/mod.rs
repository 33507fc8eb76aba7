//! Use-case services built on repositories and sessions.
//!
//! # Responsibility
//! - Offer account and recipe use-cases without exposing SQL to callers.
//! - Translate repository errors into use-case level errors.

pub mod account_service;
pub mod recipe_service;
