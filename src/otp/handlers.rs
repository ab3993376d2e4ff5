use axum::{
    extract::State,
    routing::{post, put},
    Json, Router,
};
use rand::Rng;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        jwt::AuthUser,
        password::{hash_password, verify_password},
    },
    dto::MessageResponse,
    error::{ApiError, ApiResult},
    otp::repo::{self, OtpRecord},
    state::AppState,
    users::repo::User,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forgot", post(forgot_password))
        .route("/verify-otp", post(verify_otp))
        .route("/reset", post(reset_password))
        .route("/change", put(change_password))
}

#[derive(Debug, Deserialize)]
pub struct ForgotRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

fn is_expired(created_at: OffsetDateTime, ttl_minutes: i64, now: OffsetDateTime) -> bool {
    now - created_at > Duration::minutes(ttl_minutes)
}

/// Expiry and hash check shared by verify and reset. Both failure modes
/// collapse into one message so the endpoint leaks nothing about which
/// part was wrong.
fn check_code(record: &OtpRecord, otp: &str, ttl_minutes: i64) -> ApiResult<()> {
    if is_expired(record.created_at, ttl_minutes, OffsetDateTime::now_utc())
        || !verify_password(otp, &record.code_hash)?
    {
        warn!(email = %record.email, "otp rejected");
        return Err(ApiError::validation("Invalid or expired OTP"));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::not_found("No account found"))?;

    let code = generate_code();
    let code_hash = hash_password(&code)?;
    repo::upsert(&state.db, &email, &code_hash).await?;
    state.mailer.send_otp(&email, &code).await?;

    info!(email = %email, "otp sent");
    Ok(Json(MessageResponse {
        message: "OTP sent to your email".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = payload.email.trim().to_lowercase();
    let record = repo::find(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::validation("Invalid or expired OTP"))?;

    check_code(&record, &payload.otp, state.config.otp_ttl_minutes)?;

    // Verification does not consume the code; the reset step does.
    Ok(Json(MessageResponse {
        message: "OTP verified successfully".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = payload.email.trim().to_lowercase();
    if payload.new_password.len() < 8 {
        return Err(ApiError::validation("Password too short"));
    }

    let record = repo::find(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::validation("Invalid or expired OTP"))?;
    check_code(&record, &payload.otp, state.config.otp_ttl_minutes)?;

    let hash = hash_password(&payload.new_password)?;
    User::update_password_by_email(&state.db, &email, &hash).await?;
    repo::delete(&state.db, &email).await?;

    info!(email = %email, "password reset");
    Ok(Json(MessageResponse {
        message: "Password reset successful".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if payload.new_password.len() < 8 {
        return Err(ApiError::validation("Password too short"));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user_id, "change password with wrong current password");
        return Err(ApiError::unauthorized("Incorrect current password"));
    }

    let hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user_id, &hash).await?;

    info!(user_id = %user_id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn expiry_window() {
        let created = datetime!(2026-08-07 10:00 UTC);
        assert!(!is_expired(created, 5, datetime!(2026-08-07 10:04 UTC)));
        assert!(is_expired(created, 5, datetime!(2026-08-07 10:06 UTC)));
    }

    #[test]
    fn fresh_code_passes_check() {
        let code = "123456";
        let record = OtpRecord {
            email: "user@example.com".into(),
            code_hash: hash_password(code).unwrap(),
            created_at: OffsetDateTime::now_utc(),
        };
        assert!(check_code(&record, code, 5).is_ok());
        assert!(check_code(&record, "000000", 5).is_err());
    }

    #[test]
    fn stale_code_fails_check() {
        let code = "123456";
        let record = OtpRecord {
            email: "user@example.com".into(),
            code_hash: hash_password(code).unwrap(),
            created_at: OffsetDateTime::now_utc() - Duration::minutes(10),
        };
        assert!(check_code(&record, code, 5).is_err());
    }
}
