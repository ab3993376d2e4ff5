use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    badges::{self, evaluator::Signals, service as badge_service},
    dto::MessageResponse,
    error::{ApiError, ApiResult},
    media::{
        repo::Media,
        stats::{average_rating, favorite_type},
    },
    state::AppState,
    users::{
        dto::{FollowResponse, ProfileStats, ProfileUser, PublicProfileResponse, UnfollowResponse},
        repo::{self, User},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/:id", post(follow_user))
        .route("/unfollow/:id", post(unfollow_user))
        .route("/favorites", get(list_favorites))
        .route(
            "/favorites/:media_id",
            post(add_favorite).delete(remove_favorite),
        )
        .route("/:username", get(public_profile))
}

#[instrument(skip(state))]
pub async fn follow_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(target_id): Path<Uuid>,
) -> ApiResult<Json<FollowResponse>> {
    if user_id == target_id {
        return Err(ApiError::validation("Cannot follow yourself"));
    }
    let target = User::find_by_id(&state.db, target_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Target user not found"))?;

    let inserted = repo::follow(&state.db, user_id, target_id).await?;
    if inserted {
        info!(follower = %user_id, followed = %target_id, "follow created");
    }

    // Both sides can cross a threshold: the caller on following count,
    // the target on follower count. The caller's unlocks go back for
    // toast display; the target discovers theirs on their next check.
    let signals = Signals::at(OffsetDateTime::now_utc());
    let new_badges = badge_service::check_and_award(&state, user_id, &signals).await?;
    badge_service::check_and_award(&state, target.id, &Signals::default()).await?;

    let followers_count = repo::follower_count(&state.db, target_id).await?;
    Ok(Json(FollowResponse {
        message: "Followed successfully".into(),
        followers_count,
        new_badges,
    }))
}

#[instrument(skip(state))]
pub async fn unfollow_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(target_id): Path<Uuid>,
) -> ApiResult<Json<UnfollowResponse>> {
    repo::unfollow(&state.db, user_id, target_id).await?;
    let followers_count = repo::follower_count(&state.db, target_id).await?;

    info!(follower = %user_id, followed = %target_id, "follow removed");
    Ok(Json(UnfollowResponse {
        message: "Unfollowed".into(),
        followers_count,
    }))
}

/// Public profile with collection and quick stats. Private profiles are
/// visible to their owner only.
#[instrument(skip(state, viewer))]
pub async fn public_profile(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(username): Path<String>,
) -> ApiResult<Json<PublicProfileResponse>> {
    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let is_owner = viewer.map(|AuthUser(id)| id) == Some(user.id);
    if !user.is_public && !is_owner {
        warn!(username = %username, "private profile requested");
        return Err(ApiError::forbidden("This profile is private"));
    }

    let media = crate::media::repo::list_by_user(&state.db, user.id).await?;
    let badge_ids = badges::repo::unlocked_ids(&state.db, user.id).await?;
    let followers = repo::followers_of(&state.db, user.id).await?;
    let following = repo::following_of(&state.db, user.id).await?;

    let stats = ProfileStats {
        total: media.len() as u32,
        avg_rating: average_rating(&media),
        fav_type: favorite_type(&media).unwrap_or_else(|| "-".into()),
    };

    Ok(Json(PublicProfileResponse {
        user: ProfileUser::new(&user, badge_ids, followers, following),
        media,
        stats,
    }))
}

#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(media_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    crate::media::repo::get(&state.db, media_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Media not found"))?;
    repo::add_favorite(&state.db, user_id, media_id).await?;

    Ok(Json(MessageResponse::new("Added to favorites")))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(media_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    repo::remove_favorite(&state.db, user_id, media_id).await?;
    Ok(Json(MessageResponse::new("Removed from favorites")))
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Media>>> {
    let favorites = repo::list_favorites(&state.db, user_id).await?;
    Ok(Json(favorites))
}
