// src/lib.rs

//! Legacy gallery shortcode migration
//!
//! Rewrites `[singlepic=<id> ...]` markers left behind by a retired gallery
//! plugin into native media library attachments.
//!
//! # Architecture
//!
//! - `migrate`: the core (paging, extraction, resolution, import, rewrite),
//!   talking to storage and network only through traits
//! - `db`: SQLite adapter implementing those traits over the CMS tables
//! - `config`: TOML configuration with command-line overrides
//! - `progress`: progress reporting for interactive and scripted runs

pub mod config;
pub mod db;
mod error;
pub mod migrate;
pub mod progress;

pub use config::{ConfigOverrides, MigrateConfig};
pub use error::{Error, Result};
pub use migrate::{
    Collaborators, HttpFetcher, MigrationContext, MigrationDriver, MigrationSummary,
    ShortcodeKind,
};
pub use progress::{CliProgress, LogProgress, ProgressTracker, SilentProgress};
