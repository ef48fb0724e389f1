//! Shared types, error model, and configuration for Monotone.
//!
//! This crate is the foundation depended on by all other Monotone crates.
//! It provides:
//! - [`MonotoneError`]: the unified error type
//! - Domain types ([`TutorialId`], [`RouteParam`], [`TutorialSummary`])
//! - Configuration ([`AppConfig`], [`ContentConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentConfig, ContentSource, RenderConfig, UiConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate,
};
pub use error::{MonotoneError, Result};
pub use types::{RouteParam, TutorialId, TutorialSummary};
