use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::auth::jwt::AuthUser;
use crate::community::repo::{self, FeedItem};
use crate::error::ApiResult;
use crate::state::AppState;

const FEED_LIMIT: i64 = 50;

pub fn router() -> Router<AppState> {
    Router::new().route("/feed", get(community_feed))
}

#[instrument(skip(state))]
pub async fn community_feed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<FeedItem>>> {
    let feed = repo::feed(&state.db, user_id, FEED_LIMIT).await?;
    Ok(Json(feed))
}
