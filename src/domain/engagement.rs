use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Feedback attached to exactly one wish. Never edited after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub wish_id: i64,
    pub name: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
