use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::media::repo::Media;

/// Feed entry: an activity snapshot joined with its author.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub avatar: String,
    pub action: String,
    pub item_title: String,
    pub media_type: String,
    pub genre: String,
    pub language: String,
    pub platform: String,
    pub mood: String,
    pub status: String,
    pub rating: Option<f64>,
    pub created_at: OffsetDateTime,
}

/// Write the immutable snapshot of a freshly created media entry.
/// Snapshots survive edits and deletion of the item itself.
pub async fn insert_activity(db: &PgPool, media: &Media) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO activities (user_id, media_id, action, item_title, media_type, genre, \
                                 language, platform, mood, status, rating) \
         VALUES ($1, $2, 'added', $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(media.user_id)
    .bind(media.id)
    .bind(&media.title)
    .bind(&media.media_type)
    .bind(&media.genre)
    .bind(&media.language)
    .bind(&media.platform)
    .bind(&media.mood)
    .bind(&media.status)
    .bind(media.rating)
    .execute(db)
    .await?;
    Ok(())
}

/// Newest activities of the accounts `user_id` follows.
pub async fn feed(db: &PgPool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<FeedItem>> {
    let rows = sqlx::query_as::<_, FeedItem>(
        "SELECT a.id, a.user_id, u.username, u.avatar, a.action, a.item_title, a.media_type, \
                a.genre, a.language, a.platform, a.mood, a.status, a.rating, a.created_at \
         FROM activities a \
         JOIN users u ON u.id = a.user_id \
         WHERE a.user_id IN (SELECT followed_id FROM follows WHERE follower_id = $1) \
         ORDER BY a.created_at DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
