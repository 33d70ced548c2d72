//! Shared types, error model, and configuration for dmfinder.
//!
//! This crate is the foundation depended on by all other dmfinder crates.
//! It provides:
//! - [`DmfinderError`]: the unified error type
//! - Domain types ([`Company`], [`SearchResult`], [`ExtractedContact`], [`Contact`])
//! - Configuration ([`AppConfig`], [`Credentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Credentials, LlmConfig, SchedulerConfig, SearchConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, load_dotenv,
};
pub use error::{DmfinderError, Result};
pub use types::{
    CONTACT_COLUMNS, Company, Contact, ExtractedContact, GENERIC_EMAIL_TITLE, Hit, SearchResult,
};
