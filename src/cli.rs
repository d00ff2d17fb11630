// src/cli.rs
//! CLI definitions for gallery-migrate
//!
//! Argument parsing only; the command implementations are in `commands`.

use clap::{Args, Parser, Subcommand};
use gallery_migrate::ConfigOverrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gallery-migrate")]
#[command(author, version)]
#[command(about = "Migrate legacy gallery [singlepic] shortcodes to media library attachments", long_about = None)]
pub struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import referenced pictures and rewrite shortcodes in posts and pages
    Migrate(MigrateArgs),
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the database file
    #[arg(short, long)]
    pub db_path: Option<String>,

    /// Prefix of the CMS table names (default: wp_)
    #[arg(long)]
    pub table_prefix: Option<String>,

    /// Directory new uploads are written to
    #[arg(long)]
    pub uploads_dir: Option<PathBuf>,

    /// Public site URL used in attachment links
    #[arg(long)]
    pub site_url: Option<String>,

    /// Download pictures from this URL instead of reading them from disk
    #[arg(long)]
    pub source_base_url: Option<String>,

    /// Directory gallery paths are relative to when reading from disk
    #[arg(long)]
    pub storage_root: Option<PathBuf>,

    /// Records fetched per page (default: 1000)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Stop after this many records (0 = no limit)
    #[arg(short, long)]
    pub limit_records: Option<usize>,

    /// Resolve pictures and report, without importing or rewriting anything
    #[arg(long)]
    pub dry_run: bool,
}

impl MigrateArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            db_path: self.db_path.clone(),
            table_prefix: self.table_prefix.clone(),
            uploads_dir: self.uploads_dir.clone(),
            site_url: self.site_url.clone(),
            source_base_url: self.source_base_url.clone(),
            storage_root: self.storage_root.clone(),
            page_size: self.page_size,
            limit_records: self.limit_records,
            dry_run: self.dry_run,
        }
    }
}
