// src/config.rs
//! Configuration file parsing for migration runs
//!
//! Supports TOML configuration files with the following sections:
//! - [database] - Database file and table prefix
//! - [media] - Upload directory and public site URL
//! - [source] - Where legacy picture files are read from
//! - [run] - Page size, record limit, dry run, shortcode kind
//!
//! Command-line options override file values, which override defaults.

use crate::db::TablePrefix;
use crate::migrate::{DEFAULT_PAGE_SIZE, MigrationContext, ShortcodeKind};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct MigrateConfig {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub media: MediaSection,

    #[serde(default)]
    pub source: SourceSection,

    #[serde(default)]
    pub run: RunSection,
}

/// Database configuration section
#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    /// SQLite file holding the CMS tables
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Prefix of the CMS table names
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            table_prefix: default_table_prefix(),
        }
    }
}

fn default_db_path() -> String {
    "wordpress.db".to_string()
}

fn default_table_prefix() -> String {
    crate::db::DEFAULT_TABLE_PREFIX.to_string()
}

/// Media library configuration section
#[derive(Debug, Deserialize)]
pub struct MediaSection {
    /// Directory new uploads are written to
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// Public URL of the site, used to build attachment URLs
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

impl Default for MediaSection {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            site_url: default_site_url(),
        }
    }
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("wp-content/uploads")
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

/// Legacy picture source section
#[derive(Debug, Deserialize)]
pub struct SourceSection {
    /// Download pictures from here; unset or empty reads them from disk
    #[serde(default)]
    pub base_url: Option<String>,

    /// Local directory gallery paths are relative to
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// Timeout for one download (e.g., "30s", "2m")
    #[serde(default = "default_http_timeout")]
    pub http_timeout: String,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            base_url: None,
            storage_root: default_storage_root(),
            http_timeout: default_http_timeout(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_http_timeout() -> String {
    "30s".to_string()
}

/// Run behavior section
#[derive(Debug, Deserialize)]
pub struct RunSection {
    /// Records fetched per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Stop after this many records (0 = no limit)
    #[serde(default)]
    pub limit_records: usize,

    /// Resolve pictures but write nothing
    #[serde(default)]
    pub dry_run: bool,

    /// Shortcode to migrate
    #[serde(default = "default_shortcode")]
    pub shortcode: String,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            limit_records: 0,
            dry_run: false,
            shortcode: default_shortcode(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_shortcode() -> String {
    ShortcodeKind::SinglePic.as_str().to_string()
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub db_path: Option<String>,
    pub table_prefix: Option<String>,
    pub uploads_dir: Option<PathBuf>,
    pub site_url: Option<String>,
    pub source_base_url: Option<String>,
    pub storage_root: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub limit_records: Option<usize>,
    pub dry_run: bool,
}

impl MigrateConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: MigrateConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line values on top of this configuration
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.db_path {
            self.database.path = path;
        }
        if let Some(prefix) = overrides.table_prefix {
            self.database.table_prefix = prefix;
        }
        if let Some(dir) = overrides.uploads_dir {
            self.media.uploads_dir = dir;
        }
        if let Some(url) = overrides.site_url {
            self.media.site_url = url;
        }
        if let Some(url) = overrides.source_base_url {
            self.source.base_url = Some(url);
        }
        if let Some(root) = overrides.storage_root {
            self.source.storage_root = root;
        }
        if let Some(size) = overrides.page_size {
            self.run.page_size = size;
        }
        if let Some(limit) = overrides.limit_records {
            self.run.limit_records = limit;
        }
        if overrides.dry_run {
            self.run.dry_run = true;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.table_prefix()?;

        if self.run.page_size == 0 {
            anyhow::bail!("run.page_size must be greater than 0");
        }

        self.shortcode_kind()?;
        self.http_timeout()?;

        parse_http_url(&self.media.site_url)
            .with_context(|| format!("Invalid media.site_url: {}", self.media.site_url))?;

        if let Some(base_url) = self.base_url() {
            parse_http_url(base_url)
                .with_context(|| format!("Invalid source.base_url: {base_url}"))?;
        }

        Ok(())
    }

    pub fn table_prefix(&self) -> Result<TablePrefix> {
        Ok(TablePrefix::new(&self.database.table_prefix)?)
    }

    pub fn shortcode_kind(&self) -> Result<ShortcodeKind> {
        Ok(self.run.shortcode.parse::<ShortcodeKind>()?)
    }

    pub fn http_timeout(&self) -> Result<Duration> {
        parse_duration(&self.source.http_timeout)
            .with_context(|| format!("Invalid source.http_timeout: {}", self.source.http_timeout))
    }

    /// Remote base URL, if downloads are enabled
    pub fn base_url(&self) -> Option<&str> {
        self.source
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Build the run context for the migration driver
    pub fn to_context(&self) -> Result<MigrationContext> {
        Ok(MigrationContext::new(
            self.run.limit_records,
            self.base_url().map(str::to_string),
            self.source.storage_root.clone(),
        )
        .with_page_size(self.run.page_size)
        .with_kind(self.shortcode_kind()?)
        .with_dry_run(self.run.dry_run))
    }
}

fn parse_http_url(value: &str) -> Result<Url> {
    let url = Url::parse(value)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("unsupported URL scheme '{other}'"),
    }
}

/// Parse a duration string (e.g., "30", "30s", "2m", "1h")
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 60 * 60)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration number: {}", num_str))?;

    if num == 0 {
        anyhow::bail!("Duration must be greater than 0");
    }

    Ok(Duration::from_secs(num * multiplier))
}
