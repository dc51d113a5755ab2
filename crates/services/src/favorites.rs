use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::repository::FavoriteListRepository;
use vocab_core::model::{FavoriteList, FavoriteListId, NewFavoriteList, UserId};
use vocab_core::quiz::ResultsSummary;

use crate::Clock;
use crate::error::FavoritesError;
use crate::identity::IdentityService;

/// Suggested name for a list saved at `now`.
#[must_use]
pub fn default_list_name(now: DateTime<Utc>) -> String {
    format!("Words - {}", now.format("%Y-%m-%d"))
}

/// Saved lists of unknown words, scoped to the signed-in user.
#[derive(Clone)]
pub struct FavoriteService {
    clock: Clock,
    identity: Arc<IdentityService>,
    favorites: Arc<dyn FavoriteListRepository>,
}

impl FavoriteService {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<IdentityService>,
        favorites: Arc<dyn FavoriteListRepository>,
    ) -> Self {
        Self {
            clock,
            identity,
            favorites,
        }
    }

    fn owner(&self) -> Result<UserId, FavoritesError> {
        self.identity
            .current_user()
            .map(|user| user.uid)
            .ok_or(FavoritesError::NotAuthenticated)
    }

    /// Name suggested for a list saved right now.
    #[must_use]
    pub fn suggested_name(&self) -> String {
        default_list_name(self.clock.now())
    }

    /// Persist the unknown words of a finished session under `name`.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::NotAuthenticated` without a signed-in user,
    /// `FavoritesError::List` for a blank name or no unknown words, or the storage error.
    pub async fn save_unknown_words(
        &self,
        name: &str,
        results: &ResultsSummary,
    ) -> Result<FavoriteList, FavoritesError> {
        let owner = self.owner()?;
        let list = NewFavoriteList::new(
            owner,
            name,
            self.clock.now(),
            results.unknown_words_list.clone(),
        )?;

        let id = self.favorites.insert_list(&list).await?;
        tracing::info!(list_id = %id, words = list.words().len(), "favorite list saved");
        Ok(list.assign_id(id))
    }

    /// Lists of the signed-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::NotAuthenticated` or the storage error.
    pub async fn list(&self) -> Result<Vec<FavoriteList>, FavoritesError> {
        let owner = self.owner()?;
        Ok(self.favorites.list_for_owner(&owner).await?)
    }

    /// # Errors
    ///
    /// Returns `FavoritesError::NotAuthenticated` or the storage error.
    pub async fn get(&self, id: FavoriteListId) -> Result<Option<FavoriteList>, FavoritesError> {
        let owner = self.owner()?;
        Ok(self.favorites.get_list(&owner, id).await?)
    }

    /// # Errors
    ///
    /// Returns `FavoritesError::NotAuthenticated`, or `FavoritesError::Storage` with
    /// `StorageError::NotFound` when the user has no such list.
    pub async fn delete(&self, id: FavoriteListId) -> Result<(), FavoritesError> {
        let owner = self.owner()?;
        self.favorites.delete_list(&owner, id).await?;
        tracing::info!(list_id = %id, "favorite list deleted");
        Ok(())
    }
}
