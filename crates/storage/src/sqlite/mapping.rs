use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use vocab_core::model::{FavoriteList, FavoriteListId, UserId, WordRecord};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn list_id_to_i64(id: FavoriteListId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("list_id overflow".into()))
}

pub(crate) fn list_id_from_i64(v: i64) -> Result<FavoriteListId, StorageError> {
    u64::try_from(v)
        .map(FavoriteListId::new)
        .map_err(|_| StorageError::Serialization(format!("list_id sign overflow: {v}")))
}

pub(crate) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| StorageError::Serialization("position overflow".into()))
}

pub(crate) fn map_word_row(row: &SqliteRow) -> Result<WordRecord, StorageError> {
    Ok(WordRecord {
        english: row.try_get("word_english").map_err(ser)?,
        hebrew: row.try_get("word_hebrew").map_err(ser)?,
        description: row.try_get("description_en").map_err(ser)?,
    })
}

/// Build a domain list from its header row and its words (already in position order).
pub(crate) fn map_list_row(
    row: &SqliteRow,
    words: Vec<WordRecord>,
) -> Result<FavoriteList, StorageError> {
    let id = list_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let owner = UserId::new(row.try_get::<String, _>("owner_id").map_err(ser)?);
    let name: String = row.try_get("name").map_err(ser)?;
    let created_at = row.try_get("created_at").map_err(ser)?;

    FavoriteList::from_persisted(id, owner, name, created_at, words).map_err(ser)
}
