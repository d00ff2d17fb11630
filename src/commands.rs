// src/commands.rs
//! Command handlers for the gallery-migrate CLI

use crate::cli::MigrateArgs;
use anyhow::{Context, Result};
use gallery_migrate::db::SqliteStore;
use gallery_migrate::migrate::{RemoteFetch, SourceLocation};
use gallery_migrate::{
    CliProgress, Collaborators, HttpFetcher, LogProgress, MigrateConfig, MigrationDriver,
    ProgressTracker, SilentProgress,
};
use std::io::IsTerminal;
use tracing::info;

/// Run the shortcode migration
pub fn cmd_migrate(args: &MigrateArgs, quiet: bool) -> Result<()> {
    let mut config = MigrateConfig::load_or_default(args.config.as_deref())?;
    config.apply(args.overrides());
    config.validate()?;

    let context = config.to_context()?;
    info!(
        "Migrating {} shortcodes in {} (page size {}, limit {})",
        context.kind(),
        config.database.path,
        context.page_size(),
        context.limit_records()
    );

    let store = SqliteStore::open(
        &config.database.path,
        config.table_prefix()?,
        &config.media.uploads_dir,
        &config.media.site_url,
    )
    .with_context(|| format!("Failed to open database {}", config.database.path))?;

    let fetcher = match context.source() {
        SourceLocation::Remote { base_url } => {
            info!("Downloading pictures from {}", base_url);
            Some(HttpFetcher::new(config.http_timeout()?)?)
        }
        SourceLocation::Local { root } => {
            info!("Reading pictures from {}", root.display());
            None
        }
    };

    let progress: Box<dyn ProgressTracker> = if quiet {
        Box::new(SilentProgress::new())
    } else if std::io::stderr().is_terminal() {
        Box::new(CliProgress::new("migrate"))
    } else {
        Box::new(LogProgress::new("migrate"))
    };

    let collaborators = Collaborators {
        content: &store,
        pictures: &store,
        media: &store,
        fetcher: fetcher.as_ref().map(|f| f as &dyn RemoteFetch),
    };

    let summary = MigrationDriver::new(context, collaborators, progress.as_ref())?
        .run()
        .context("Migration aborted")?;

    println!("{summary}");
    if summary.limit_reached {
        println!("Stopped at the record limit; run again to continue.");
    }
    if summary.has_failures() {
        println!("Some markers were left in place; see the warnings above.");
    }
    if summary.dry_run {
        println!("Dry run: nothing was imported or rewritten.");
    }
    println!("Done.");
    Ok(())
}
