use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::badges::rules::BadgeRule;
use crate::media::repo::Media;
use crate::users::repo::{User, UserSummary};

/// Profile as shown to other users. No email, no password hash, no
/// progress counters.
#[derive(Debug, Serialize)]
pub struct ProfileUser {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
    pub bio: String,
    pub theme: String,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
    pub badges: Vec<String>,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

impl ProfileUser {
    pub fn new(
        user: &User,
        badges: Vec<String>,
        followers: Vec<UserSummary>,
        following: Vec<UserSummary>,
    ) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            theme: user.theme.clone(),
            is_public: user.is_public,
            created_at: user.created_at,
            badges,
            followers,
            following,
        }
    }
}

/// Quick stats for the profile header.
#[derive(Debug, Serialize)]
pub struct ProfileStats {
    pub total: u32,
    pub avg_rating: f64,
    pub fav_type: String,
}

#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub user: ProfileUser,
    pub media: Vec<Media>,
    pub stats: ProfileStats,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: String,
    pub followers_count: i64,
    pub new_badges: Vec<&'static BadgeRule>,
}

#[derive(Debug, Serialize)]
pub struct UnfollowResponse {
    pub message: String,
    pub followers_count: i64,
}
