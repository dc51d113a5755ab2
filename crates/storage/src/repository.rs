use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use vocab_core::model::{FavoriteList, FavoriteListId, NewFavoriteList, UserId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for saved favorite lists.
///
/// Every call is scoped to an owner: a list owned by someone else behaves as if it
/// did not exist.
#[async_trait]
pub trait FavoriteListRepository: Send + Sync {
    /// Persist a new list together with its words and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be stored.
    async fn insert_list(&self, list: &NewFavoriteList) -> Result<FavoriteListId, StorageError>;

    /// All lists of an owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<FavoriteList>, StorageError>;

    /// Fetch a single list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_list(
        &self,
        owner: &UserId,
        id: FavoriteListId,
    ) -> Result<Option<FavoriteList>, StorageError>;

    /// Delete a list and its words.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the owner has no such list.
    async fn delete_list(&self, owner: &UserId, id: FavoriteListId) -> Result<(), StorageError>;
}

pub(crate) fn newest_first(lists: &mut [FavoriteList]) {
    lists.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
}

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    lists: HashMap<FavoriteListId, FavoriteList>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoriteListRepository for InMemoryRepository {
    async fn insert_list(&self, list: &NewFavoriteList) -> Result<FavoriteListId, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let id = FavoriteListId::new(guard.next_id);
        guard.lists.insert(id, list.clone().assign_id(id));
        Ok(id)
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<FavoriteList>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut lists: Vec<_> = guard
            .lists
            .values()
            .filter(|list| list.owner() == owner)
            .cloned()
            .collect();
        newest_first(&mut lists);
        Ok(lists)
    }

    async fn get_list(
        &self,
        owner: &UserId,
        id: FavoriteListId,
    ) -> Result<Option<FavoriteList>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .lists
            .get(&id)
            .filter(|list| list.owner() == owner)
            .cloned())
    }

    async fn delete_list(&self, owner: &UserId, id: FavoriteListId) -> Result<(), StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.lists.get(&id) {
            Some(list) if list.owner() == owner => {
                guard.lists.remove(&id);
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub favorites: Arc<dyn FavoriteListRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let favorites: Arc<dyn FavoriteListRepository> = Arc::new(InMemoryRepository::new());
        Self { favorites }
    }
}
