use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Profile fields a user may update about themselves.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub theme: Option<String>,
    pub is_public: Option<bool>,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
    pub theme: String,
    pub role: String,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            theme: user.theme.clone(),
            role: user.role.clone(),
            is_public: user.is_public,
            created_at: user.created_at,
        }
    }
}

/// Cumulative per-type counters shown on the badges page.
#[derive(Debug, Serialize)]
pub struct BadgeProgress {
    pub movies: i32,
    pub series: i32,
    pub books: i32,
    pub games: i32,
    pub total: i32,
}

impl From<&User> for BadgeProgress {
    fn from(user: &User) -> Self {
        Self {
            movies: user.progress_movies,
            series: user.progress_series,
            books: user.progress_books,
            games: user.progress_games,
            total: user.progress_total,
        }
    }
}

/// Response for `GET /api/auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
    pub badges: Vec<String>,
    pub badge_progress: BadgeProgress,
    pub followers_count: i64,
    pub following_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "casey".into(),
            email: "casey@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            avatar: "".into(),
            bio: "watches everything".into(),
            theme: "dark".into(),
            role: "user".into(),
            is_public: true,
            progress_movies: 3,
            progress_series: 0,
            progress_books: 1,
            progress_games: 0,
            progress_total: 4,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(json.contains("casey@example.com"));
        assert!(!json.contains("argon2id"));
    }
}
