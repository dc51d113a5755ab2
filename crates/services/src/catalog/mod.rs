//! Word catalog loading: file or HTTP sources, CSV parsing, built-in fallback.

mod parse;

use std::fmt;
use std::path::PathBuf;

use reqwest::Client;
use vocab_core::model::WordRecord;

use crate::Clock;
use crate::error::CatalogError;

pub use parse::{fallback_words, parse_catalog};

/// Where a catalog CSV can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Http(String),
}

impl CatalogSource {
    /// `http://` and `https://` locations become HTTP sources, anything else a file path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Http(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Http(url) => f.write_str(url),
        }
    }
}

/// Which source a loaded catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Index into the loader's configured sources.
    Source(usize),
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCatalog {
    pub words: Vec<WordRecord>,
    pub origin: CatalogOrigin,
}

/// Loads the master word catalog, trying each source in order.
#[derive(Clone)]
pub struct CatalogLoader {
    client: Client,
    clock: Clock,
    sources: Vec<CatalogSource>,
}

impl CatalogLoader {
    #[must_use]
    pub fn new(clock: Clock, sources: Vec<CatalogSource>) -> Self {
        Self {
            client: Client::new(),
            clock,
            sources,
        }
    }

    #[must_use]
    pub fn sources(&self) -> &[CatalogSource] {
        &self.sources
    }

    /// Load the catalog, falling back to the built-in word set when every source fails.
    ///
    /// Never fails and never returns an empty catalog.
    pub async fn load(&self, bypass_cache: bool) -> LoadedCatalog {
        match self.try_load(bypass_cache).await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(%err, "using fallback word set");
                LoadedCatalog {
                    words: fallback_words(),
                    origin: CatalogOrigin::Fallback,
                }
            }
        }
    }

    /// Load the catalog from the first source that yields at least one word.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoSources` when nothing is configured and
    /// `CatalogError::AllSourcesFailed` when every source failed.
    pub async fn try_load(&self, bypass_cache: bool) -> Result<LoadedCatalog, CatalogError> {
        if self.sources.is_empty() {
            return Err(CatalogError::NoSources);
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for (index, source) in self.sources.iter().enumerate() {
            match self.fetch(source, bypass_cache).await {
                Ok(words) => {
                    tracing::info!(%source, words = words.len(), "catalog loaded");
                    return Ok(LoadedCatalog {
                        words,
                        origin: CatalogOrigin::Source(index),
                    });
                }
                Err(err) => {
                    tracing::warn!(%source, %err, "catalog source failed");
                    failures.push(format!("{source}: {err}"));
                }
            }
        }
        Err(CatalogError::AllSourcesFailed(failures))
    }

    async fn fetch(
        &self,
        source: &CatalogSource,
        bypass_cache: bool,
    ) -> Result<Vec<WordRecord>, CatalogError> {
        let text = match source {
            CatalogSource::File(path) => tokio::fs::read_to_string(path).await?,
            CatalogSource::Http(url) => {
                let url = if bypass_cache {
                    cache_busted(url, self.clock.now_millis())
                } else {
                    url.clone()
                };
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(CatalogError::HttpStatus(response.status()));
                }
                response.text().await?
            }
        };

        let words = parse_catalog(&text)?;
        if words.is_empty() {
            return Err(CatalogError::Empty {
                source_name: source.to_string(),
            });
        }
        Ok(words)
    }
}

fn cache_busted(url: &str, millis: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}nocache={millis}")
}
