use tracing::info;
use uuid::Uuid;

use crate::badges::evaluator::{evaluate, CollectionStats, Signals};
use crate::badges::repo;
use crate::badges::rules::BadgeRule;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::{media, users};

/// Re-derive the user's counters, evaluate every rule and persist the
/// newly crossed ones. Returns the delta for toast display.
///
/// Not transactional with the mutation that triggered it: a crash in
/// between leaves the badge list behind by one evaluation, and the
/// next run catches up.
pub async fn check_and_award(
    state: &AppState,
    user_id: Uuid,
    signals: &Signals,
) -> ApiResult<Vec<&'static BadgeRule>> {
    let rows = media::repo::list_by_user(&state.db, user_id).await?;
    let followers = users::repo::follower_count(&state.db, user_id).await?;
    let following = users::repo::following_count(&state.db, user_id).await?;

    let stats = CollectionStats::from_media(&rows, followers as u32, following as u32);
    let unlocked = repo::unlocked_set(&state.db, user_id).await?;
    let new_badges = evaluate(&stats, signals, &unlocked);

    if !new_badges.is_empty() {
        let ids: Vec<&str> = new_badges.iter().map(|r| r.id).collect();
        repo::award(&state.db, user_id, &ids).await?;
        info!(user_id = %user_id, badges = ?ids, "badges unlocked");
    }

    Ok(new_badges)
}
