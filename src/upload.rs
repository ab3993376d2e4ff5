use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/thumbnail", post(upload_thumbnail))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// POST /api/upload/thumbnail (multipart, field `file`)
/// Stores the image and returns the public URL to put on a media entry.
#[instrument(skip(state, mp))]
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let ext = ext_from_mime(&content_type)
            .ok_or_else(|| ApiError::validation("Unsupported image type"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("failed to read file: {e}")))?;
        if data.is_empty() {
            return Err(ApiError::validation("Empty file"));
        }

        let key = format!("thumbnails/{}/{}.{}", user_id, Uuid::new_v4(), ext);
        state.storage.put_object(&key, data, &content_type).await?;

        let url = state.storage.public_url(&key);
        info!(user_id = %user_id, %key, "thumbnail uploaded");
        return Ok(Json(UploadResponse { url }));
    }

    Err(ApiError::validation("No file uploaded"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_from_mime_covers_supported_images() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/pdf"), None);
    }

    #[tokio::test]
    async fn public_url_uses_storage_base() {
        let state = crate::state::AppState::fake();
        let url = state.storage.public_url("thumbnails/u/x.png");
        assert_eq!(url, "https://fake.local/thumbnails/u/x.png");
    }
}
