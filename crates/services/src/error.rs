//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use vocab_core::model::FavoriteListError;

/// Errors emitted while loading the word catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("no catalog sources configured")]
    NoSources,
    #[error("catalog source {source_name} is empty")]
    Empty { source_name: String },
    #[error("catalog request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("all catalog sources failed: {}", .0.join("; "))]
    AllSourcesFailed(Vec<String>),
}

/// Errors emitted by identity providers and `IdentityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },
    #[error("an account with this email already exists")]
    EmailInUse,
    #[error("wrong email or password")]
    InvalidCredentials,
    #[error("this account has been disabled")]
    Disabled,
    #[error("identity provider error: {0}")]
    Provider(String),
    #[error("identity request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `FavoriteService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FavoritesError {
    #[error("please log in to use saved lists")]
    NotAuthenticated,
    #[error(transparent)]
    List(#[from] FavoriteListError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
