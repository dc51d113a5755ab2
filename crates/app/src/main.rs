use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use services::{AppServices, Clock};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod shell;

use config::{AppConfig, CliOverrides};
use shell::Shell;

#[derive(Parser)]
#[command(name = "vocab", version, about = "English-Hebrew vocabulary self-test")]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database for saved lists (e.g. sqlite:vocab.sqlite3)
    #[arg(long)]
    db: Option<String>,

    /// Catalog CSV path or URL; repeat to add fallbacks
    #[arg(long = "catalog")]
    catalog: Vec<String>,

    /// Bypass HTTP caches when fetching the catalog
    #[arg(long)]
    no_cache: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = CliOverrides {
        db_url: cli.db,
        catalog_sources: cli.catalog,
        no_cache: cli.no_cache,
    };
    let config = AppConfig::resolve(cli.config.as_deref(), &overrides)?;
    tracing::debug!(?config, "configuration resolved");

    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(
        &config.db_url,
        Clock::system(),
        config.identity_provider(),
        config.catalog_sources(),
    )
    .await
    .with_context(|| format!("failed to open {}", config.db_url))?;

    let mut shell = Shell::new(services, config.bypass_catalog_cache, std::io::stdout());
    shell.load_catalog().await?;
    shell.run(BufReader::new(tokio::io::stdin())).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_need_no_file() {
        prepare_sqlite_file("sqlite::memory:").unwrap();
        prepare_sqlite_file("sqlite:file:x?mode=memory&cache=shared").unwrap();
    }

    #[test]
    fn creates_missing_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vocab.sqlite3");
        prepare_sqlite_file(&format!("sqlite://{}?mode=rwc", path.display())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn rejects_urls_without_a_path() {
        assert!(prepare_sqlite_file("postgres://db").is_err());
        assert!(prepare_sqlite_file("sqlite://").is_err());
    }

    #[test]
    fn cli_collects_repeated_catalogs() {
        let cli = Cli::parse_from([
            "vocab",
            "--catalog",
            "a.csv",
            "--catalog",
            "https://example.com/b.csv",
            "--no-cache",
        ]);
        assert_eq!(cli.catalog, vec!["a.csv", "https://example.com/b.csv"]);
        assert!(cli.no_cache);
        assert!(cli.db.is_none());
    }
}
