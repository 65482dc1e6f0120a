use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;
use time::OffsetDateTime;

use crate::domain::engagement::Comment;
use crate::domain::wish::Wish;
use crate::infra::db::{decode_timestamp, encode_timestamp, Db};

#[derive(Clone)]
pub struct WishService {
    db: Db,
}

impl WishService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create_wish(
        &self,
        name: String,
        message: String,
        photo: Option<String>,
        created_at: OffsetDateTime,
    ) -> Result<Wish> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            "INSERT INTO wishes (name, message, photo, created_at) VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, name, message, photo, created_at, likes",
        )
        .bind(name)
        .bind(message)
        .bind(photo)
        .bind(encode_timestamp(created_at)?)
        .fetch_one(&mut *tx)
        .await?;
        let wish = wish_from_row(&row, Vec::new())?;

        tx.commit().await?;
        Ok(wish)
    }

    pub async fn get_wish(&self, wish_id: i64) -> Result<Option<Wish>> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            "SELECT id, name, message, photo, created_at, likes FROM wishes WHERE id = ?1",
        )
        .bind(wish_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let comments = sqlx::query(
            "SELECT id, wish_id, name, message, created_at \
             FROM comments \
             WHERE wish_id = ?1 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(wish_id)
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(comment_from_row)
        .collect::<Result<Vec<_>>>()?;

        tx.commit().await?;

        Ok(Some(wish_from_row(&row, comments)?))
    }

    /// All wishes, newest first, each carrying its comments oldest first.
    /// Both reads share one transaction so the listing is a single snapshot.
    pub async fn list_wishes(&self) -> Result<Vec<Wish>> {
        let mut tx = self.db.pool().begin().await?;

        let wish_rows = sqlx::query(
            "SELECT id, name, message, photo, created_at, likes \
             FROM wishes \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let comment_rows = sqlx::query(
            "SELECT id, wish_id, name, message, created_at \
             FROM comments \
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut comments_by_wish: HashMap<i64, Vec<Comment>> = HashMap::new();
        for row in &comment_rows {
            let comment = comment_from_row(row)?;
            comments_by_wish
                .entry(comment.wish_id)
                .or_default()
                .push(comment);
        }

        let mut wishes = Vec::with_capacity(wish_rows.len());
        for row in &wish_rows {
            let id: i64 = row.get("id");
            let comments = comments_by_wish.remove(&id).unwrap_or_default();
            wishes.push(wish_from_row(row, comments)?);
        }

        Ok(wishes)
    }

    /// Deletes a wish together with every comment it owns.
    /// Returns the deleted wish (without comments) so the caller can drop its media.
    pub async fn delete_wish(&self, wish_id: i64) -> Result<Option<Wish>> {
        let mut tx = self.db.pool().begin().await?;

        let removed_comments = sqlx::query("DELETE FROM comments WHERE wish_id = ?1")
            .bind(wish_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let row = sqlx::query(
            "DELETE FROM wishes WHERE id = ?1 \
             RETURNING id, name, message, photo, created_at, likes",
        )
        .bind(wish_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Dropping the transaction without commit rolls back.
        let Some(row) = row else {
            return Ok(None);
        };
        let wish = wish_from_row(&row, Vec::new())?;

        tx.commit().await?;

        tracing::info!(wish_id, removed_comments, "deleted wish");
        Ok(Some(wish))
    }
}

fn wish_from_row(row: &SqliteRow, comments: Vec<Comment>) -> Result<Wish> {
    let created_at: String = row.get("created_at");
    Ok(Wish {
        id: row.get("id"),
        name: row.get("name"),
        message: row.get("message"),
        photo: row.get("photo"),
        created_at: decode_timestamp(&created_at)?,
        likes: row.get("likes"),
        comments,
    })
}

pub(crate) fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    let created_at: String = row.get("created_at");
    Ok(Comment {
        id: row.get("id"),
        wish_id: row.get("wish_id"),
        name: row.get("name"),
        message: row.get("message"),
        created_at: decode_timestamp(&created_at)?,
    })
}
