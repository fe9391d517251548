/// Leaderboard reads for display.
///
/// Real rows come from the store. A challenge with no real rows gets a
/// synthesized demo board instead, which only lives in the response.

use rand::Rng;

use crate::domain::leaderboard;
use crate::store::{now_secs, Challenge, DocumentStore, LeaderboardEntry, StoreError};

#[derive(Clone, Debug)]
pub struct ChallengeBoard {
    pub challenge: Challenge,
    pub entries: Vec<LeaderboardEntry>,
    pub has_real_scores: bool,
}

/// Real leaderboard, or demo rows when there are none.
///
/// Not-configured and not-found propagate. A transient read failure
/// degrades to the demo board.
pub fn leaderboard_with_demo(
    store: &dyn DocumentStore,
    challenge_id: &str,
    limit: usize,
    rng: &mut impl Rng,
) -> Result<Vec<LeaderboardEntry>, StoreError> {
    match store.get_leaderboard(challenge_id, limit) {
        Ok(rows) if !rows.is_empty() => Ok(rows),
        Ok(_) => Ok(leaderboard::demo_entries(challenge_id, limit, now_secs(), rng)),
        Err(e @ (StoreError::NotConfigured | StoreError::NotFound(_))) => Err(e),
        Err(e) => {
            log::warn!("leaderboard for {challenge_id} unavailable, showing demo rows: {e}");
            Ok(leaderboard::demo_entries(challenge_id, limit, now_secs(), rng))
        }
    }
}

/// Every challenge (optionally only `owner`'s) with its board.
pub fn global_leaderboards(
    store: &dyn DocumentStore,
    owner: Option<&str>,
    limit_per_challenge: usize,
    rng: &mut impl Rng,
) -> Result<Vec<ChallengeBoard>, StoreError> {
    let challenges = store.list_challenges(owner)?;
    let mut boards = Vec::with_capacity(challenges.len());
    for challenge in challenges {
        let entries = leaderboard_with_demo(store, &challenge.id, limit_per_challenge, rng)?;
        let has_real_scores = entries.first().is_some_and(|e| !e.is_demo);
        boards.push(ChallengeBoard { challenge, entries, has_real_scores });
    }
    Ok(boards)
}
