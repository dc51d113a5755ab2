use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{FavoriteListId, UserId, WordRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FavoriteListError {
    #[error("list name cannot be empty")]
    EmptyName,

    #[error("a favorite list needs at least one word")]
    EmptyWords,
}

//
// ─── NEW LIST ──────────────────────────────────────────────────────────────────
//

/// A validated favorite list that has not been assigned an id by a store yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFavoriteList {
    owner: UserId,
    name: String,
    created_at: DateTime<Utc>,
    words: Vec<WordRecord>,
}

impl NewFavoriteList {
    /// Validate a list about to be saved. The name is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `FavoriteListError::EmptyName` for a blank name and
    /// `FavoriteListError::EmptyWords` when there is nothing to save.
    pub fn new(
        owner: UserId,
        name: impl AsRef<str>,
        created_at: DateTime<Utc>,
        words: Vec<WordRecord>,
    ) -> Result<Self, FavoriteListError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(FavoriteListError::EmptyName);
        }
        if words.is_empty() {
            return Err(FavoriteListError::EmptyWords);
        }

        Ok(Self {
            owner,
            name: name.to_owned(),
            created_at,
            words,
        })
    }

    #[must_use]
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    #[must_use]
    pub fn assign_id(self, id: FavoriteListId) -> FavoriteList {
        FavoriteList {
            id,
            owner: self.owner,
            name: self.name,
            created_at: self.created_at,
            words: self.words,
        }
    }
}

//
// ─── SAVED LIST ────────────────────────────────────────────────────────────────
//

/// A named snapshot of unknown words, owned by one user. Read-only once saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteList {
    id: FavoriteListId,
    owner: UserId,
    name: String,
    created_at: DateTime<Utc>,
    words: Vec<WordRecord>,
}

impl FavoriteList {
    /// Rehydrate a list from storage.
    ///
    /// # Errors
    ///
    /// Same validation as [`NewFavoriteList::new`].
    pub fn from_persisted(
        id: FavoriteListId,
        owner: UserId,
        name: String,
        created_at: DateTime<Utc>,
        words: Vec<WordRecord>,
    ) -> Result<Self, FavoriteListError> {
        Ok(NewFavoriteList::new(owner, name, created_at, words)?.assign_id(id))
    }

    #[must_use]
    pub fn id(&self) -> FavoriteListId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    #[must_use]
    pub fn into_words(self) -> Vec<WordRecord> {
        self.words
    }
}
