// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("gallery-migrate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("gallery-migrate Contributors")
        .about("Migrate legacy gallery [singlepic] shortcodes to media library attachments")
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Only log warnings and errors"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Import referenced pictures and rewrite shortcodes in posts and pages")
                .arg(Arg::new("config").short('c').long("config").value_name("FILE").help("TOML configuration file"))
                .arg(Arg::new("db_path").short('d').long("db-path").value_name("PATH").help("Path to the database file"))
                .arg(Arg::new("table_prefix").long("table-prefix").value_name("PREFIX").help("Prefix of the CMS table names (default: wp_)"))
                .arg(Arg::new("uploads_dir").long("uploads-dir").value_name("DIR").help("Directory new uploads are written to"))
                .arg(Arg::new("site_url").long("site-url").value_name("URL").help("Public site URL used in attachment links"))
                .arg(
                    Arg::new("source_base_url")
                        .long("source-base-url")
                        .value_name("URL")
                        .help("Download pictures from this URL instead of reading them from disk"),
                )
                .arg(
                    Arg::new("storage_root")
                        .long("storage-root")
                        .value_name("DIR")
                        .help("Directory gallery paths are relative to when reading from disk"),
                )
                .arg(Arg::new("page_size").long("page-size").value_name("N").help("Records fetched per page (default: 1000)"))
                .arg(
                    Arg::new("limit_records")
                        .short('l')
                        .long("limit-records")
                        .value_name("N")
                        .help("Stop after this many records (0 = no limit)"),
                )
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Resolve pictures and report, without importing or rewriting anything"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("gallery-migrate.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
