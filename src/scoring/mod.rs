//! Score and interests lookups.
//!
//! Scores are computed from the identity fields and memoised in the store's
//! cache for an hour. Interests are read straight from the store and fail the
//! call when the store is unreachable.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::fields::Gender;
use crate::requests::OnlineScoreArgs;
use crate::store::{Store, StoreError, StoreKey};

/// Cache lifetime of a computed score.
pub const SCORE_TTL_MINUTES: u64 = 60;

const BIRTHDAY_KEY_FORMAT: &str = "%Y%m%d";

/// Cache key for the identity in `args`.
pub fn score_key(args: &OnlineScoreArgs) -> String {
    let birthday = args
        .birthday
        .map(|d| d.format(BIRTHDAY_KEY_FORMAT).to_string())
        .unwrap_or_default();
    let material = format!(
        "{}{}{}{}",
        args.first_name.as_deref().unwrap_or_default(),
        args.last_name.as_deref().unwrap_or_default(),
        args.phone.as_deref().unwrap_or_default(),
        birthday,
    );
    StoreKey::scoring(hex::encode(Sha256::digest(material.as_bytes()))).to_string()
}

/// Weighted sum over the identity fields that are present.
pub fn compute_score(args: &OnlineScoreArgs) -> f64 {
    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    let gender_known = args.gender.is_some_and(|g| g != Gender::Unknown);

    let mut score = 0.0;
    if filled(&args.phone) {
        score += 1.5;
    }
    if filled(&args.email) {
        score += 1.5;
    }
    if args.birthday.is_some() && gender_known {
        score += 1.5;
    }
    if filled(&args.first_name) && filled(&args.last_name) {
        score += 0.5;
    }
    score
}

/// Cached score when present, otherwise computed and cached.
///
/// Never fails: a cache outage only costs a recomputation.
pub async fn get_score(store: &Store, args: &OnlineScoreArgs) -> f64 {
    let key = score_key(args);
    if let Some(score) = store.cache_get(&key).await.and_then(|v| v.as_f64()) {
        return score;
    }

    let score = compute_score(args);
    if !store.cache_set(&key, Value::from(score), SCORE_TTL_MINUTES).await {
        tracing::debug!(key = %key, "Score not cached");
    }
    score
}

/// Interests recorded for `client_id`. A missing record reads as empty.
pub async fn get_interests(store: &Store, client_id: i64) -> Result<Vec<String>, StoreError> {
    let raw = store.get(&StoreKey::interests(client_id).to_string()).await?;
    let interests: Option<Vec<String>> = serde_json::from_str(&raw).map_err(|e| {
        StoreError::Backend(format!("malformed interests for client {client_id}: {e}"))
    })?;
    Ok(interests.unwrap_or_default())
}
