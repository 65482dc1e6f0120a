use anyhow::Result;
use time::OffsetDateTime;

use crate::app::wishes::comment_from_row;
use crate::domain::engagement::Comment;
use crate::infra::db::{encode_timestamp, Db};

#[derive(Clone)]
pub struct EngagementService {
    db: Db,
}

impl EngagementService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Increments the like counter in a single statement so concurrent likes
    /// on the same wish never lose an update. `None` when the wish is unknown.
    /// The new count is returned only after the increment is committed.
    pub async fn like_wish(&self, wish_id: i64) -> Result<Option<i64>> {
        let mut tx = self.db.pool().begin().await?;

        let likes: Option<i64> = sqlx::query_scalar(
            "UPDATE wishes SET likes = likes + 1 WHERE id = ?1 RETURNING likes",
        )
        .bind(wish_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(likes)
    }

    /// Inserts a comment only if the owning wish exists. `None` when it does not.
    pub async fn add_comment(
        &self,
        wish_id: i64,
        name: String,
        message: String,
        created_at: OffsetDateTime,
    ) -> Result<Option<Comment>> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            "INSERT INTO comments (wish_id, name, message, created_at) \
             SELECT id, ?2, ?3, ?4 FROM wishes WHERE id = ?1 \
             RETURNING id, wish_id, name, message, created_at",
        )
        .bind(wish_id)
        .bind(name)
        .bind(message)
        .bind(encode_timestamp(created_at)?)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let comment = comment_from_row(&row)?;

        tx.commit().await?;
        Ok(Some(comment))
    }
}
