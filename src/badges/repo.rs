use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

pub async fn unlocked_ids(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        "SELECT badge_id FROM badges WHERE user_id = $1 ORDER BY unlocked_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(ids)
}

pub async fn unlocked_set(db: &PgPool, user_id: Uuid) -> anyhow::Result<HashSet<String>> {
    Ok(unlocked_ids(db, user_id).await?.into_iter().collect())
}

/// Persist newly unlocked badges. The primary key keeps the set
/// duplicate-free even if two evaluations race.
pub async fn award(db: &PgPool, user_id: Uuid, badge_ids: &[&str]) -> anyhow::Result<()> {
    for badge_id in badge_ids {
        sqlx::query(
            "INSERT INTO badges (user_id, badge_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(db)
        .await?;
    }
    Ok(())
}

pub async fn count(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM badges WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}
