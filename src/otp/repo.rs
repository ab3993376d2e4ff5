use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// One pending reset code per email. Re-sending replaces the record,
/// which restarts the expiry clock.
#[derive(Debug, Clone, FromRow)]
pub struct OtpRecord {
    pub email: String,
    pub code_hash: String,
    pub created_at: OffsetDateTime,
}

pub async fn upsert(db: &PgPool, email: &str, code_hash: &str) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO otps (email, code_hash, created_at) VALUES ($1, $2, now()) \
         ON CONFLICT (email) DO UPDATE SET code_hash = EXCLUDED.code_hash, created_at = now()",
    )
    .bind(email)
    .bind(code_hash)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find(db: &PgPool, email: &str) -> anyhow::Result<Option<OtpRecord>> {
    let record = sqlx::query_as::<_, OtpRecord>(
        "SELECT email, code_hash, created_at FROM otps WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(record)
}

pub async fn delete(db: &PgPool, email: &str) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM otps WHERE email = $1")
        .bind(email)
        .execute(db)
        .await?;
    Ok(())
}
