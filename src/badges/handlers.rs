use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::auth::jwt::AuthUser;
use crate::badges::evaluator::Signals;
use crate::badges::rules::{BadgeRule, RULES};
use crate::badges::{repo, service};
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_badges))
        .route("/check", get(check_badges))
}

#[derive(Debug, Serialize)]
pub struct ListBadgesResponse {
    pub badges: &'static [BadgeRule],
}

#[derive(Debug, Serialize)]
pub struct CheckBadgesResponse {
    pub message: String,
    pub new_badges: Vec<&'static BadgeRule>,
    pub total_badges: i64,
}

/// All badge definitions. Public: the locked/unlocked split happens
/// client-side against the user's own list.
pub async fn list_badges() -> Json<ListBadgesResponse> {
    Json(ListBadgesResponse { badges: RULES })
}

#[instrument(skip(state))]
pub async fn check_badges(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<CheckBadgesResponse>> {
    let signals = Signals::at(OffsetDateTime::now_utc());
    let new_badges = service::check_and_award(&state, user_id, &signals).await?;
    let total_badges = repo::count(&state.db, user_id).await?;

    Ok(Json(CheckBadgesResponse {
        message: "Badges checked successfully".into(),
        new_badges,
        total_badges,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_list_serializes_definitions() {
        let json = serde_json::to_value(ListBadgesResponse { badges: RULES }).unwrap();
        let badges = json["badges"].as_array().unwrap();
        assert_eq!(badges.len(), RULES.len());
        assert!(badges.iter().any(|b| b["id"] == "movie_buff"));
    }
}
