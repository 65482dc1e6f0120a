use askama::Template;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State,
    },
    response::Html,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::app::engagement::EngagementService;
use crate::app::uploads;
use crate::app::wishes::WishService;
use crate::domain::wish::MAX_NAME_CHARS;
use crate::http::views::{CommentView, IndexTemplate, WishView};
use crate::http::{AdminToken, AppError};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db = state.db.ping().await.is_ok();
    let status = if db { "ok" } else { "degraded" };

    Json(HealthResponse { status })
}

async fn load_wish_views(state: &AppState) -> Result<Vec<WishView>, AppError> {
    let service = WishService::new(state.db.clone());
    let wishes = service
        .list_wishes()
        .await
        .map_err(|err| AppError::internal("failed to list wishes", err))?;

    let now = OffsetDateTime::now_utc();
    Ok(wishes.iter().map(|wish| WishView::new(wish, now)).collect())
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let wishes = load_wish_views(&state).await?;

    let html = IndexTemplate { wishes: &wishes }
        .render()
        .map_err(|err| AppError::internal("failed to render page", err))?;

    Ok(Html(html))
}

#[derive(Serialize)]
pub struct WishListResponse {
    pub wishes: Vec<WishView>,
}

pub async fn list_wishes(State(state): State<AppState>) -> Result<Json<WishListResponse>, AppError> {
    let wishes = load_wish_views(&state).await?;
    Ok(Json(WishListResponse { wishes }))
}

/// Fields collected from the multipart wish form.
#[derive(Default)]
struct WishForm {
    name: Option<String>,
    message: Option<String>,
    photo: Option<PhotoUpload>,
}

struct PhotoUpload {
    file_name: String,
    data: Bytes,
}

async fn read_wish_form(mut multipart: Multipart) -> Result<WishForm, AppError> {
    let mut form = WishForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "message" => form.message = Some(field.text().await?),
            "photo" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                // Browsers send an empty, unnamed part when no file was picked.
                form.photo = file_name
                    .filter(|name| !name.is_empty())
                    .map(|file_name| PhotoUpload { file_name, data });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Returns `(name, message)` or the 400 both endpoints share.
fn validate_entry(
    name: Option<String>,
    message: Option<String>,
) -> Result<(String, String), AppError> {
    let (Some(name), Some(message)) = (name, message) else {
        return Err(AppError::missing_fields());
    };
    if name.trim().is_empty() || message.trim().is_empty() {
        return Err(AppError::missing_fields());
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::bad_request(format!(
            "name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }

    Ok((name, message))
}

#[derive(Serialize)]
pub struct PostWishResponse {
    pub success: bool,
    pub wish: WishView,
}

pub async fn post_wish(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PostWishResponse>, AppError> {
    let multipart = multipart.map_err(|err| {
        tracing::warn!(error = %err, "rejected wish form");
        AppError::missing_fields()
    })?;
    let form = read_wish_form(multipart).await?;
    let (name, message) = validate_entry(form.name, form.message)?;

    let now = OffsetDateTime::now_utc();

    let photo = match form.photo {
        Some(upload) => match uploads::stored_filename(&upload.file_name, now) {
            Some(stored) => {
                let stored = state
                    .media
                    .save_unique(&stored, &upload.data, |n| {
                        uploads::numbered_filename(&stored, n)
                    })
                    .await
                    .map_err(|err| AppError::internal("failed to store upload", err))?;
                Some(stored)
            }
            None => {
                tracing::info!(file_name = %upload.file_name, "ignoring upload with disallowed name");
                None
            }
        },
        None => None,
    };

    let service = WishService::new(state.db.clone());
    let wish = match service.create_wish(name, message, photo.clone(), now).await {
        Ok(wish) => wish,
        Err(err) => {
            if let Some(stored) = &photo {
                if let Err(err) = state.media.remove(stored).await {
                    tracing::warn!(error = ?err, file_name = %stored, "failed to remove orphaned upload");
                }
            }
            return Err(AppError::internal("failed to create wish", err));
        }
    };

    tracing::info!(wish_id = wish.id, has_photo = wish.photo.is_some(), "created wish");

    Ok(Json(PostWishResponse {
        success: true,
        wish: WishView::new(&wish, now),
    }))
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes: i64,
}

pub async fn like_wish(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<LikeResponse>, AppError> {
    let service = EngagementService::new(state.db.clone());
    let likes = service
        .like_wish(id)
        .await
        .map_err(|err| AppError::internal("failed to like wish", err))?
        .ok_or_else(AppError::wish_not_found)?;

    Ok(Json(LikeResponse {
        success: true,
        likes,
    }))
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub name: Option<String>,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub success: bool,
    pub comment: CommentView,
}

pub async fn add_comment(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<CommentResponse>, AppError> {
    let Json(payload) = payload.map_err(|err| {
        tracing::warn!(error = %err, wish_id = id, "rejected comment body");
        AppError::from(err)
    })?;
    let (name, message) = validate_entry(payload.name, payload.message)?;

    let now = OffsetDateTime::now_utc();
    let service = EngagementService::new(state.db.clone());
    let comment = service
        .add_comment(id, name, message, now)
        .await
        .map_err(|err| AppError::internal("failed to add comment", err))?
        .ok_or_else(AppError::wish_not_found)?;

    tracing::info!(wish_id = id, comment_id = comment.id, "added comment");

    Ok(Json(CommentResponse {
        success: true,
        comment: CommentView::new(&comment, now),
    }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

pub async fn delete_wish(
    Path(id): Path<i64>,
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let service = WishService::new(state.db.clone());
    let wish = service
        .delete_wish(id)
        .await
        .map_err(|err| AppError::internal("failed to delete wish", err))?
        .ok_or_else(AppError::wish_not_found)?;

    if let Some(photo) = &wish.photo {
        if let Err(err) = state.media.remove(photo).await {
            tracing::warn!(error = ?err, wish_id = id, file_name = %photo, "failed to remove wish media");
        }
    }

    Ok(Json(DeleteResponse { success: true }))
}
