//! Configuration schema and loading for liaison.
//!
//! A single `liaison.toml` (project-local or `~/.config/liaison/`) with
//! `${ENV_VAR}` substitution applied before parsing. Missing file means
//! defaults; the binary then overlays CLI/env values and validates.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{ConfigError, EngineSettings, LiaisonConfig, TelegramConfig, Texts},
};
