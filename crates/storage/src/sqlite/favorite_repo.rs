use std::collections::HashMap;

use sqlx::Row;
use vocab_core::model::{FavoriteList, FavoriteListId, NewFavoriteList, UserId, WordRecord};

use super::SqliteRepository;
use super::mapping::{list_id_from_i64, list_id_to_i64, map_list_row, map_word_row, position_to_i64, ser};
use crate::repository::{FavoriteListRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SqliteRepository {
    async fn words_for_list(&self, list_id: i64) -> Result<Vec<WordRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT word_english, word_hebrew, description_en
                FROM favorite_list_words
                WHERE list_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_word_row).collect()
    }
}

#[async_trait::async_trait]
impl FavoriteListRepository for SqliteRepository {
    async fn insert_list(&self, list: &NewFavoriteList) -> Result<FavoriteListId, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO favorite_lists (owner_id, name, created_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(list.owner().as_str())
        .bind(list.name())
        .bind(list.created_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        let list_id = res.last_insert_rowid();

        for (position, word) in list.words().iter().enumerate() {
            sqlx::query(
                r"
                    INSERT INTO favorite_list_words (
                        list_id, position, word_english, word_hebrew, description_en
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(list_id)
            .bind(position_to_i64(position)?)
            .bind(word.english.as_str())
            .bind(word.hebrew.as_str())
            .bind(word.description.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        tracing::debug!(list_id, words = list.words().len(), "favorite list inserted");
        list_id_from_i64(list_id)
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<FavoriteList>, StorageError> {
        let list_rows = sqlx::query(
            r"
                SELECT id, owner_id, name, created_at
                FROM favorite_lists
                WHERE owner_id = ?1
                ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let word_rows = sqlx::query(
            r"
                SELECT w.list_id, w.word_english, w.word_hebrew, w.description_en
                FROM favorite_list_words w
                JOIN favorite_lists l ON l.id = w.list_id
                WHERE l.owner_id = ?1
                ORDER BY w.list_id ASC, w.position ASC
            ",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut words_by_list: HashMap<i64, Vec<WordRecord>> = HashMap::new();
        for row in &word_rows {
            let list_id: i64 = row.try_get("list_id").map_err(ser)?;
            words_by_list
                .entry(list_id)
                .or_default()
                .push(map_word_row(row)?);
        }

        let mut out = Vec::with_capacity(list_rows.len());
        for row in &list_rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            let words = words_by_list.remove(&id).unwrap_or_default();
            out.push(map_list_row(row, words)?);
        }
        Ok(out)
    }

    async fn get_list(
        &self,
        owner: &UserId,
        id: FavoriteListId,
    ) -> Result<Option<FavoriteList>, StorageError> {
        let list_id = list_id_to_i64(id)?;
        let row = sqlx::query(
            r"
                SELECT id, owner_id, name, created_at
                FROM favorite_lists
                WHERE id = ?1 AND owner_id = ?2
            ",
        )
        .bind(list_id)
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        match row {
            Some(row) => {
                let words = self.words_for_list(list_id).await?;
                map_list_row(&row, words).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn delete_list(&self, owner: &UserId, id: FavoriteListId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM favorite_lists WHERE id = ?1 AND owner_id = ?2")
            .bind(list_id_to_i64(id)?)
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
