use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use services::identity::DEFAULT_IDENTITY_BASE_URL;
use services::{
    CatalogSource, HostedIdentityConfig, HostedIdentityProvider, IdentityProvider,
    InMemoryIdentityProvider,
};

/// Which identity backend the app signs users in with.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IdentityConfig {
    /// Accounts live only for the lifetime of the process.
    #[default]
    Memory,
    Hosted {
        api_key: String,
        #[serde(default = "default_identity_base_url")]
        base_url: String,
    },
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityConfig::Memory => f.write_str("Memory"),
            IdentityConfig::Hosted {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Hosted")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_identity_base_url() -> String {
    DEFAULT_IDENTITY_BASE_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Tried in order; `http(s)://` entries are fetched, anything else is read from disk.
    #[serde(default = "default_catalog_sources")]
    pub catalog_sources: Vec<String>,
    #[serde(default)]
    pub bypass_catalog_cache: bool,
    #[serde(default)]
    pub identity: IdentityConfig,
}

fn default_db_url() -> String {
    "sqlite://vocab.sqlite3".to_string()
}

fn default_catalog_sources() -> Vec<String> {
    vec!["data/words.csv".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: default_db_url(),
            catalog_sources: default_catalog_sources(),
            bypass_catalog_cache: false,
            identity: IdentityConfig::default(),
        }
    }
}

/// Flag values that override file and environment settings.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_url: Option<String>,
    pub catalog_sources: Vec<String>,
    pub no_cache: bool,
}

impl AppConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// File (if any), then process environment, then command-line flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn resolve(path: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(cli);
        config.db_url = normalize_sqlite_url(&config.db_url);
        Ok(config)
    }

    /// Apply `VOCAB_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(db_url) = lookup("VOCAB_DB_URL") {
            self.db_url = db_url;
        }

        let env_base_url = lookup("VOCAB_IDENTITY_BASE_URL");
        if let Some(api_key) = lookup("VOCAB_IDENTITY_API_KEY") {
            let base_url = match &self.identity {
                IdentityConfig::Hosted { base_url, .. } => base_url.clone(),
                IdentityConfig::Memory => default_identity_base_url(),
            };
            self.identity = IdentityConfig::Hosted { api_key, base_url };
        }
        if let (Some(url), IdentityConfig::Hosted { base_url, .. }) =
            (env_base_url, &mut self.identity)
        {
            *base_url = url;
        }
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(db_url) = &cli.db_url {
            self.db_url.clone_from(db_url);
        }
        if !cli.catalog_sources.is_empty() {
            self.catalog_sources.clone_from(&cli.catalog_sources);
        }
        if cli.no_cache {
            self.bypass_catalog_cache = true;
        }
    }

    #[must_use]
    pub fn catalog_sources(&self) -> Vec<CatalogSource> {
        self.catalog_sources
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| CatalogSource::parse(raw))
            .collect()
    }

    #[must_use]
    pub fn identity_provider(&self) -> Arc<dyn IdentityProvider> {
        match &self.identity {
            IdentityConfig::Memory => Arc::new(InMemoryIdentityProvider::new()),
            IdentityConfig::Hosted { api_key, base_url } => {
                Arc::new(HostedIdentityProvider::new(HostedIdentityConfig {
                    base_url: base_url.clone(),
                    api_key: api_key.clone(),
                }))
            }
        }
    }
}

/// Turn relative `SQLite` paths into absolute `sqlite://` URLs.
///
/// In-memory URLs (`sqlite::memory:`, `sqlite:file:...`) pass through untouched.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw == "sqlite::memory:" || raw.starts_with("sqlite:file:") {
        return raw.to_string();
    }

    let rest = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_to_empty_file() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.identity, IdentityConfig::Memory);
        assert_eq!(
            config.catalog_sources(),
            vec![CatalogSource::File(PathBuf::from("data/words.csv"))]
        );
    }

    #[test]
    fn parses_hosted_identity_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
db_url = "sqlite:///tmp/words.db"
catalog_sources = ["https://example.com/words.csv", "data/words.csv"]
bypass_catalog_cache = true

[identity]
type = "hosted"
api_key = "abc123"
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.bypass_catalog_cache);
        assert_eq!(
            config.identity,
            IdentityConfig::Hosted {
                api_key: "abc123".into(),
                base_url: DEFAULT_IDENTITY_BASE_URL.into(),
            }
        );
        assert!(matches!(config.catalog_sources()[0], CatalogSource::Http(_)));
        assert!(!format!("{config:?}").contains("abc123"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(AppConfig::from_file(Path::new("/no/such/vocab.toml")).is_err());
    }

    #[test]
    fn env_overrides_switch_to_hosted_identity() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("VOCAB_DB_URL", "sqlite:///tmp/env.db"),
            ("VOCAB_IDENTITY_API_KEY", "env-key"),
            ("VOCAB_IDENTITY_BASE_URL", "http://localhost:9099"),
        ]));

        assert_eq!(config.db_url, "sqlite:///tmp/env.db");
        assert_eq!(
            config.identity,
            IdentityConfig::Hosted {
                api_key: "env-key".into(),
                base_url: "http://localhost:9099".into(),
            }
        );
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("VOCAB_IDENTITY_API_KEY", "  "), ("VOCAB_DB_URL", "")]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn cli_flags_win() {
        let mut config = AppConfig::default();
        config.apply_cli(&CliOverrides {
            db_url: Some("sqlite:///tmp/cli.db".into()),
            catalog_sources: vec!["a.csv".into(), "b.csv".into()],
            no_cache: true,
        });
        assert_eq!(config.db_url, "sqlite:///tmp/cli.db");
        assert_eq!(config.catalog_sources, vec!["a.csv", "b.csv"]);
        assert!(config.bypass_catalog_cache);
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:file:x?mode=memory&cache=shared"),
            "sqlite:file:x?mode=memory&cache=shared"
        );
        assert_eq!(normalize_sqlite_url("sqlite:///tmp/a.db"), "sqlite:///tmp/a.db");
        assert_eq!(
            normalize_sqlite_url("/tmp/a.db?mode=rwc"),
            "sqlite:///tmp/a.db?mode=rwc"
        );

        let relative = normalize_sqlite_url("sqlite://vocab.sqlite3");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("vocab.sqlite3"));
    }
}
