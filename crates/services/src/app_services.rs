use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog::{CatalogLoader, CatalogSource};
use crate::error::AppServicesError;
use crate::favorites::FavoriteService;
use crate::identity::{IdentityProvider, IdentityService, InMemoryIdentityProvider};

/// Assembles the app-facing services around one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogLoader>,
    identity: Arc<IdentityService>,
    favorites: Arc<FavoriteService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        catalog_sources: Vec<CatalogSource>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::assemble(storage, clock, identity, catalog_sources))
    }

    /// Build services with in-memory storage and accounts.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog_sources: Vec<CatalogSource>) -> Self {
        Self::assemble(
            Storage::in_memory(),
            clock,
            Arc::new(InMemoryIdentityProvider::new()),
            catalog_sources,
        )
    }

    fn assemble(
        storage: Storage,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        catalog_sources: Vec<CatalogSource>,
    ) -> Self {
        let identity = Arc::new(IdentityService::new(identity));
        let favorites = Arc::new(FavoriteService::new(
            clock,
            Arc::clone(&identity),
            Arc::clone(&storage.favorites),
        ));
        let catalog = Arc::new(CatalogLoader::new(clock, catalog_sources));

        Self {
            catalog,
            identity,
            favorites,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogLoader> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn identity(&self) -> Arc<IdentityService> {
        Arc::clone(&self.identity)
    }

    #[must_use]
    pub fn favorites(&self) -> Arc<FavoriteService> {
        Arc::clone(&self.favorites)
    }
}
