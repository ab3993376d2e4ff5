use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    badges::{evaluator::Signals, service as badge_service},
    community,
    dto::MessageResponse,
    error::{ApiError, ApiResult},
    media::{
        dto::{CreateMediaRequest, MediaMutationResponse, UpdateMediaRequest},
        repo::{self, Media},
        stats,
    },
    state::AppState,
    users::repo::User,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_media).post(create_media))
        .route("/:id", axum::routing::put(update_media).delete(delete_media))
        .route("/stats/overview", get(stats_overview))
}

#[instrument(skip(state, payload))]
pub async fn create_media(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMediaRequest>,
) -> ApiResult<(StatusCode, Json<MediaMutationResponse>)> {
    let values = payload.into_values()?;
    let media = repo::insert(&state.db, user_id, &values).await?;

    // Everything past the insert is non-transactional follow-up: the
    // entry exists even if a later step fails, and the next evaluation
    // catches up on badges.
    community::repo::insert_activity(&state.db, &media).await?;
    User::bump_progress(&state.db, user_id, &media.media_type).await?;

    let signals = Signals::from_submission(OffsetDateTime::now_utc(), media.rating, media.date);
    let new_badges = badge_service::check_and_award(&state, user_id, &signals).await?;

    info!(user_id = %user_id, media_id = %media.id, media_type = %media.media_type, "media created");
    Ok((
        StatusCode::CREATED,
        Json(MediaMutationResponse { media, new_badges }),
    ))
}

#[instrument(skip(state))]
pub async fn list_media(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Media>>> {
    let rows = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(rows))
}

/// Load a media row and make sure `user_id` owns it.
async fn owned_media(state: &AppState, user_id: Uuid, id: Uuid) -> ApiResult<Media> {
    let media = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Media not found"))?;
    if media.user_id != user_id {
        warn!(user_id = %user_id, media_id = %id, owner = %media.user_id, "ownership check failed");
        return Err(ApiError::forbidden("Not authorized"));
    }
    Ok(media)
}

#[instrument(skip(state, payload))]
pub async fn update_media(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMediaRequest>,
) -> ApiResult<Json<MediaMutationResponse>> {
    let existing = owned_media(&state, user_id, id).await?;
    let values = payload.merge_into(&existing)?;
    let media = repo::update(&state.db, id, &values).await?;

    let signals = Signals::from_submission(OffsetDateTime::now_utc(), media.rating, media.date);
    let new_badges = badge_service::check_and_award(&state, user_id, &signals).await?;

    info!(user_id = %user_id, media_id = %id, "media updated");
    Ok(Json(MediaMutationResponse { media, new_badges }))
}

#[instrument(skip(state))]
pub async fn delete_media(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    owned_media(&state, user_id, id).await?;
    repo::delete(&state.db, id).await?;

    info!(user_id = %user_id, media_id = %id, "media deleted");
    Ok(Json(MessageResponse::new("Media deleted successfully")))
}

#[instrument(skip(state))]
pub async fn stats_overview(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<stats::StatsOverview>> {
    let rows = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(stats::overview(&rows, OffsetDateTime::now_utc())))
}
