use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, avatar, bio, theme, role, \
     is_public, progress_movies, progress_series, progress_books, progress_games, \
     progress_total, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub bio: String,
    pub theme: String,
    pub role: String,
    pub is_public: bool,
    pub progress_movies: i32,
    pub progress_series: i32,
    pub progress_books: i32,
    pub progress_games: i32,
    pub progress_total: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Lightweight user reference used in follower lists and the feed.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
}

/// Fields a user may change about themselves. `None` leaves the
/// column untouched.
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub theme: Option<String>,
    pub is_public: Option<bool>,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(db)
            .await?;
        Ok(user)
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET \
               bio       = COALESCE($2, bio), \
               avatar    = COALESCE($3, avatar), \
               theme     = COALESCE($4, theme), \
               is_public = COALESCE($5, is_public), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(patch.bio.as_deref())
            .bind(patch.avatar.as_deref())
            .bind(patch.theme.as_deref())
            .bind(patch.is_public)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_password_by_email(
        db: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE email = $1")
            .bind(email)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_role(db: &PgPool, id: Uuid, role: &str) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(role)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Remove the account. Media, follows, favorites, activities and
    /// badges go with it via foreign-key cascade.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(db).await?;
        Ok(users)
    }

    /// Bump the cumulative badge-progress counters after a media entry
    /// is created. Counters only ever grow; deletes do not roll them back.
    pub async fn bump_progress(db: &PgPool, id: Uuid, media_type: &str) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET \
               progress_total  = progress_total + 1, \
               progress_movies = progress_movies + CASE WHEN $2 = 'movie'  THEN 1 ELSE 0 END, \
               progress_series = progress_series + CASE WHEN $2 = 'series' THEN 1 ELSE 0 END, \
               progress_books  = progress_books  + CASE WHEN $2 = 'book'   THEN 1 ELSE 0 END, \
               progress_games  = progress_games  + CASE WHEN $2 = 'game'   THEN 1 ELSE 0 END, \
               updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(media_type)
        .execute(db)
        .await?;
        Ok(())
    }
}

// ---- follow graph ----

/// Insert a follow edge. Returns false when the edge already existed.
pub async fn follow(db: &PgPool, follower_id: Uuid, followed_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "INSERT INTO follows (follower_id, followed_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(follower_id)
    .bind(followed_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn unfollow(db: &PgPool, follower_id: Uuid, followed_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
        .bind(follower_id)
        .bind(followed_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn follower_count(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE followed_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn following_count(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn followers_of(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<UserSummary>> {
    let rows = sqlx::query_as::<_, UserSummary>(
        "SELECT u.id, u.username, u.avatar \
         FROM follows f JOIN users u ON u.id = f.follower_id \
         WHERE f.followed_id = $1 \
         ORDER BY f.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn following_of(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<UserSummary>> {
    let rows = sqlx::query_as::<_, UserSummary>(
        "SELECT u.id, u.username, u.avatar \
         FROM follows f JOIN users u ON u.id = f.followed_id \
         WHERE f.follower_id = $1 \
         ORDER BY f.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

// ---- favorites ----

pub async fn add_favorite(db: &PgPool, user_id: Uuid, media_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO favorites (user_id, media_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(media_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn remove_favorite(db: &PgPool, user_id: Uuid, media_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND media_id = $2")
        .bind(user_id)
        .bind(media_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn list_favorites(
    db: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Vec<crate::media::repo::Media>> {
    let rows = sqlx::query_as::<_, crate::media::repo::Media>(
        "SELECT m.id, m.user_id, m.title, m.media_type, m.genre, m.language, m.platform, \
                m.mood, m.status, m.rating, m.notes, m.date, m.thumbnail, m.created_at, \
                m.updated_at \
         FROM favorites f JOIN media m ON m.id = f.media_id \
         WHERE f.user_id = $1 \
         ORDER BY f.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
