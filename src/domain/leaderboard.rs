/// Leaderboard rules: best-score merge, ranking and demo rows.
///
/// The merge keeps one entry per (challenge, user) and only ever raises it,
/// so submissions may arrive in any order and still converge on the best
/// score seen. Demo rows fill an empty board for display and are never
/// written back.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEMO_NAMES: &[&str] = &[
    "Alex", "Jordan", "Sam", "Taylor", "Casey", "Morgan", "Riley", "Quinn",
    "Avery", "Dakota", "Cameron", "Parker", "Sage", "River", "Phoenix",
];

const DEMO_BASE_SCORE: u32 = 10;
const DEMO_MAX_SCORE: u32 = 50;
const DEMO_JITTER: u32 = 5;
const DEMO_WINDOW_SECS: u64 = 30 * 24 * 60 * 60;

/// A leaderboard row. Demo rows are synthesized on read and never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    pub user_name: String,
    pub score: u32,
    pub timestamp: u64,
    #[serde(default, skip_serializing)]
    pub is_demo: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MergeResult {
    Inserted,
    Raised,
    Kept,
}

/// Merge `candidate` into `entries`: insert when the user has no entry for
/// the challenge, replace the score only when strictly greater.
pub fn merge_best(entries: &mut Vec<LeaderboardEntry>, candidate: LeaderboardEntry) -> MergeResult {
    let existing = entries.iter_mut().find(|e| {
        e.challenge_id == candidate.challenge_id && e.user_id == candidate.user_id
    });
    match existing {
        Some(e) if candidate.score > e.score => {
            e.score = candidate.score;
            e.timestamp = candidate.timestamp;
            MergeResult::Raised
        }
        Some(_) => MergeResult::Kept,
        None => {
            entries.push(LeaderboardEntry { is_demo: false, ..candidate });
            MergeResult::Inserted
        }
    }
}

/// Best score first. Stable, so ties keep their read order.
pub fn rank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Synthesize `limit` demo rows for an empty board.
///
/// Names are distinct until the pool runs out. Scores step down from
/// `DEMO_MAX_SCORE` with a little jitter, never below `DEMO_BASE_SCORE`.
/// Timestamps fall within the 30 days before `now`.
pub fn demo_entries(challenge_id: &str, limit: usize, now: u64, rng: &mut impl Rng) -> Vec<LeaderboardEntry> {
    let mut used: Vec<&str> = Vec::with_capacity(limit);
    let mut rows = Vec::with_capacity(limit);
    let range = DEMO_MAX_SCORE - DEMO_BASE_SCORE;

    for i in 0..limit {
        let fresh: Vec<&str> = DEMO_NAMES.iter().copied().filter(|n| !used.contains(n)).collect();
        let pool = if fresh.is_empty() { DEMO_NAMES } else { &fresh[..] };
        let name = pool.choose(rng).copied().unwrap_or("Player");
        used.push(name);

        let step = (range as usize * i / limit) as u32;
        let score = (DEMO_MAX_SCORE - step + rng.random_range(0..DEMO_JITTER)).max(DEMO_BASE_SCORE);
        let timestamp = now.saturating_sub(rng.random_range(0..DEMO_WINDOW_SECS));

        rows.push(LeaderboardEntry {
            id: format!("demo-{challenge_id}-{i}"),
            challenge_id: challenge_id.to_string(),
            user_id: format!("demo-user-{i}"),
            user_name: name.to_string(),
            score,
            timestamp,
            is_demo: true,
        });
    }

    rank(&mut rows);
    rows
}
