use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

const MEDIA_COLUMNS: &str = "id, user_id, title, media_type, genre, language, platform, mood, \
     status, rating, notes, date, thumbnail, created_at, updated_at";

/// Placeholder shown until the user uploads or links a thumbnail.
pub const DEFAULT_THUMBNAIL: &str =
    "https://res.cloudinary.com/drrrye3xd/image/upload/v1761320623/default_media_thumb_pvg8kh.png";

/// A tracked piece of content owned by exactly one user. The owner
/// reference never changes after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Media {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub media_type: String,
    pub genre: String,
    pub language: String,
    pub platform: String,
    pub mood: String,
    pub status: String,
    pub rating: Option<f64>,
    pub notes: String,
    pub date: Option<Date>,
    pub thumbnail: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated column values for an insert or a full-row update.
#[derive(Debug, Clone)]
pub struct MediaValues {
    pub title: String,
    pub media_type: String,
    pub genre: String,
    pub language: String,
    pub platform: String,
    pub mood: String,
    pub status: String,
    pub rating: Option<f64>,
    pub notes: String,
    pub date: Option<Date>,
    pub thumbnail: String,
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Media>> {
    let sql = format!(
        "SELECT {MEDIA_COLUMNS} FROM media WHERE user_id = $1 ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, Media>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Media>> {
    let sql = format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1");
    let row = sqlx::query_as::<_, Media>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert(db: &PgPool, user_id: Uuid, values: &MediaValues) -> anyhow::Result<Media> {
    let sql = format!(
        "INSERT INTO media (user_id, title, media_type, genre, language, platform, mood, \
                            status, rating, notes, date, thumbnail) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING {MEDIA_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Media>(&sql)
        .bind(user_id)
        .bind(&values.title)
        .bind(&values.media_type)
        .bind(&values.genre)
        .bind(&values.language)
        .bind(&values.platform)
        .bind(&values.mood)
        .bind(&values.status)
        .bind(values.rating)
        .bind(&values.notes)
        .bind(values.date)
        .bind(&values.thumbnail)
        .fetch_one(db)
        .await?;
    Ok(row)
}

/// Full-row update; the handler merges the patch into the existing row
/// first so cleared fields (e.g. rating back to null) survive the trip.
pub async fn update(db: &PgPool, id: Uuid, values: &MediaValues) -> anyhow::Result<Media> {
    let sql = format!(
        "UPDATE media SET title = $2, media_type = $3, genre = $4, language = $5, \
                          platform = $6, mood = $7, status = $8, rating = $9, notes = $10, \
                          date = $11, thumbnail = $12, updated_at = now() \
         WHERE id = $1 \
         RETURNING {MEDIA_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Media>(&sql)
        .bind(id)
        .bind(&values.title)
        .bind(&values.media_type)
        .bind(&values.genre)
        .bind(&values.language)
        .bind(&values.platform)
        .bind(&values.mood)
        .bind(&values.status)
        .bind(values.rating)
        .bind(&values.notes)
        .bind(values.date)
        .bind(&values.thumbnail)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM media WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_all(db: &PgPool) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM media")
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Media row joined with its owner, for the admin views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaWithOwner {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub title: String,
    pub media_type: String,
    pub genre: String,
    pub status: String,
    pub rating: Option<f64>,
    pub thumbnail: String,
    pub created_at: OffsetDateTime,
}

const OWNER_COLUMNS: &str = "m.id, m.user_id, u.username, u.email, m.title, m.media_type, \
     m.genre, m.status, m.rating, m.thumbnail, m.created_at";

pub async fn list_all_with_owner(db: &PgPool) -> anyhow::Result<Vec<MediaWithOwner>> {
    let sql = format!(
        "SELECT {OWNER_COLUMNS} FROM media m JOIN users u ON u.id = m.user_id \
         ORDER BY m.created_at DESC"
    );
    let rows = sqlx::query_as::<_, MediaWithOwner>(&sql).fetch_all(db).await?;
    Ok(rows)
}

pub async fn recent_with_owner(db: &PgPool, limit: i64) -> anyhow::Result<Vec<MediaWithOwner>> {
    let sql = format!(
        "SELECT {OWNER_COLUMNS} FROM media m JOIN users u ON u.id = m.user_id \
         ORDER BY m.created_at DESC LIMIT $1"
    );
    let rows = sqlx::query_as::<_, MediaWithOwner>(&sql)
        .bind(limit)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
