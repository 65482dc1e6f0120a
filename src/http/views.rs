use askama::Template;
use serde::Serialize;
use time::OffsetDateTime;

use crate::app::humanize::time_ago;
use crate::app::uploads;
use crate::domain::engagement::Comment;
use crate::domain::wish::Wish;

/// Public URL prefix the upload directory is served under.
pub const MEDIA_URL_PREFIX: &str = "/static/uploads";

/// A wish as visitors see it: timestamps already humanized.
#[derive(Debug, Serialize)]
pub struct WishView {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub photo: Option<String>,
    pub created_at: String,
    pub likes: i64,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub name: String,
    pub message: String,
    pub created_at: String,
}

impl WishView {
    pub fn new(wish: &Wish, now: OffsetDateTime) -> Self {
        Self {
            id: wish.id,
            name: wish.name.clone(),
            message: wish.message.clone(),
            photo: wish.photo.clone(),
            created_at: time_ago(wish.created_at, now),
            likes: wish.likes,
            comments: wish
                .comments
                .iter()
                .map(|comment| CommentView::new(comment, now))
                .collect(),
        }
    }

    pub fn photo_url(&self) -> Option<String> {
        self.photo
            .as_ref()
            .map(|photo| format!("{}/{}", MEDIA_URL_PREFIX, photo))
    }

    pub fn has_video(&self) -> bool {
        self.photo.as_deref().is_some_and(uploads::is_video)
    }
}

impl CommentView {
    pub fn new(comment: &Comment, now: OffsetDateTime) -> Self {
        Self {
            name: comment.name.clone(),
            message: comment.message.clone(),
            created_at: time_ago(comment.created_at, now),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub wishes: &'a [WishView],
}
