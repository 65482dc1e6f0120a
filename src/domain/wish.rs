use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::engagement::Comment;

/// Longest accepted poster name, in characters.
pub const MAX_NAME_CHARS: usize = 100;

/// A guestbook entry and the comments it owns, oldest comment first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wish {
    pub id: i64,
    pub name: String,
    pub message: String,
    /// Stored filename under the upload directory.
    pub photo: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub likes: i64,
    pub comments: Vec<Comment>,
}
