use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{dto::PublicUser, jwt::AuthUser},
    dto::MessageResponse,
    error::{ApiError, ApiResult},
    media::repo::{self as media_repo, MediaWithOwner},
    state::AppState,
    users::repo::User,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).delete(delete_user))
        .route("/users/:id/role", put(update_role))
        .route("/media", get(list_media))
        .route("/media/:id", delete(delete_media))
        .route("/stats", get(admin_stats))
}

/// Authenticated user with the admin role. Everything in this router
/// goes through it.
pub struct AdminUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        let role = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        if role != "admin" {
            warn!(user_id = %user_id, "admin route denied");
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(AdminUser(user_id))
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdateResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_media: i64,
    pub recent_uploads: Vec<MediaWithOwner>,
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_role(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleUpdateRequest>,
) -> ApiResult<Json<RoleUpdateResponse>> {
    if !["user", "admin"].contains(&payload.role.as_str()) {
        return Err(ApiError::validation("Invalid role"));
    }
    let user = User::set_role(&state.db, id, &payload.role)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(admin = %admin.0, user_id = %id, role = %payload.role, "role updated");
    Ok(Json(RoleUpdateResponse {
        message: format!("User role updated to '{}'", payload.role),
        user: PublicUser::from(&user),
    }))
}

/// Remove an account; media, follows, favorites, activities and badges
/// cascade with it.
#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(admin = %admin.0, user_id = %id, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}

#[instrument(skip(state, _admin))]
pub async fn list_media(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<MediaWithOwner>>> {
    let media = media_repo::list_all_with_owner(&state.db).await?;
    Ok(Json(media))
}

#[instrument(skip(state, admin))]
pub async fn delete_media(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if !media_repo::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Media not found"));
    }
    info!(admin = %admin.0, media_id = %id, "media deleted by admin");
    Ok(Json(MessageResponse {
        message: "Media deleted successfully".into(),
    }))
}

#[instrument(skip(state, _admin))]
pub async fn admin_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<AdminStatsResponse>> {
    let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::from)?;
    let total_admins =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::from)?;
    let total_media = media_repo::count_all(&state.db).await?;
    let recent_uploads = media_repo::recent_with_owner(&state.db, 5).await?;

    Ok(Json(AdminStatsResponse {
        total_users,
        total_admins,
        total_media,
        recent_uploads,
    }))
}
