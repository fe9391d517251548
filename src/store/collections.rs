/// In-memory document collections and the queries over them.
///
/// Both backends share this: `MemoryStore` keeps one behind a mutex,
/// `FileStore` loads one from disk per call and writes it back.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Challenge, LeaderboardEntry, ScoreSubmission, StoreError};
use crate::domain::grid::Grid;
use crate::domain::leaderboard::{self, MergeResult};

const ID_LEN: usize = 20;

/// Stored form of a challenge. The grid is kept as row strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDoc {
    pub id: String,
    pub name: String,
    pub grid: Vec<String>,
    pub solutions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: u64,
}

impl TryFrom<&ChallengeDoc> for Challenge {
    type Error = StoreError;

    fn try_from(doc: &ChallengeDoc) -> Result<Self, Self::Error> {
        let grid = Grid::from_rows(&doc.grid)
            .map_err(|e| StoreError::Corrupt(format!("challenge {}: {e}", doc.id)))?;
        Ok(Challenge {
            id: doc.id.clone(),
            name: doc.name.clone(),
            grid,
            solutions: doc.solutions.iter().map(|s| s.to_uppercase()).collect(),
            owner_id: doc.user_id.clone(),
            created_at: doc.created_at,
        })
    }
}

/// Stored form of one submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDoc {
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    pub user_name: String,
    pub score: u32,
    pub words_found: Vec<String>,
    pub total_time: u64,
    pub timestamp: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Collections {
    pub challenges: Vec<ChallengeDoc>,
    pub scores: Vec<ScoreDoc>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

pub fn new_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

impl Collections {
    // ── Challenges ──

    pub fn list_challenges(&self, owner: Option<&str>) -> Vec<Challenge> {
        self.challenges
            .iter()
            .filter(|doc| owner.map_or(true, |o| doc.user_id.as_deref() == Some(o)))
            .filter_map(|doc| match Challenge::try_from(doc) {
                Ok(c) => Some(c),
                Err(e) => {
                    log::warn!("skipping unreadable challenge: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn get_challenge(&self, id: &str) -> Result<Challenge, StoreError> {
        let doc = self
            .challenges
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Challenge::try_from(doc)
    }

    pub fn create_challenge(
        &mut self,
        name: &str,
        grid: &Grid,
        solutions: &[String],
        owner: Option<&str>,
        now: u64,
    ) -> String {
        let id = new_id();
        self.challenges.push(ChallengeDoc {
            id: id.clone(),
            name: name.to_string(),
            grid: grid.to_rows(),
            solutions: solutions.to_vec(),
            user_id: owner.map(str::to_string),
            created_at: now,
        });
        id
    }

    // ── Scores ──

    pub fn submit_score(&mut self, sub: &ScoreSubmission, now: u64) -> MergeResult {
        self.scores.push(ScoreDoc {
            id: new_id(),
            challenge_id: sub.challenge_id.clone(),
            user_id: sub.user_id.clone(),
            user_name: sub.user_name.clone(),
            score: sub.score,
            words_found: sub.words_found.clone(),
            total_time: sub.elapsed_secs,
            timestamp: now,
        });
        leaderboard::merge_best(
            &mut self.leaderboard,
            LeaderboardEntry {
                id: new_id(),
                challenge_id: sub.challenge_id.clone(),
                user_id: sub.user_id.clone(),
                user_name: sub.user_name.clone(),
                score: sub.score,
                timestamp: now,
                is_demo: false,
            },
        )
    }

    pub fn leaderboard(&self, challenge_id: &str, limit: usize) -> Vec<LeaderboardEntry> {
        let mut rows: Vec<LeaderboardEntry> = self
            .leaderboard
            .iter()
            .filter(|e| e.challenge_id == challenge_id)
            .cloned()
            .collect();
        leaderboard::rank(&mut rows);
        rows.truncate(limit);
        rows
    }

    /// Best single record in `scores`; the first one wins a tie.
    pub fn high_score(&self, challenge_id: &str) -> Option<LeaderboardEntry> {
        let mut best: Option<&ScoreDoc> = None;
        for doc in self.scores.iter().filter(|d| d.challenge_id == challenge_id) {
            if best.map_or(true, |b| doc.score > b.score) {
                best = Some(doc);
            }
        }
        best.map(|d| LeaderboardEntry {
            id: d.id.clone(),
            challenge_id: d.challenge_id.clone(),
            user_id: d.user_id.clone(),
            user_name: d.user_name.clone(),
            score: d.score,
            timestamp: d.timestamp,
            is_demo: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(user: &str, score: u32) -> ScoreSubmission {
        ScoreSubmission {
            challenge_id: "c1".into(),
            user_id: user.into(),
            user_name: format!("{user}-name"),
            score,
            words_found: vec!["CAT".into(); score as usize],
            elapsed_secs: 30,
            seq: 1,
        }
    }

    #[test]
    fn ids_are_alphanumeric() {
        let id = new_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(new_id(), id);
    }

    #[test]
    fn challenge_create_list_get() {
        let mut c = Collections::default();
        let grid = Grid::from_rows(&["CATS", "DOGS", "BATS", "CUPS"]).unwrap();
        let a = c.create_challenge("Easy", &grid, &["CAT".to_string()], Some("alice"), 5);
        let b = c.create_challenge("Open", &grid, &[], None, 6);

        assert_eq!(c.challenges[0].grid, vec!["CATS", "DOGS", "BATS", "CUPS"]);
        assert_eq!(c.list_challenges(None).len(), 2);
        let mine = c.list_challenges(Some("alice"));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, a);

        let got = c.get_challenge(&b).unwrap();
        assert_eq!(got.name, "Open");
        assert_eq!(got.grid, grid);
        assert_eq!(got.owner_id, None);
        assert_eq!(c.get_challenge("nope"), Err(StoreError::NotFound("nope".into())));
    }

    #[test]
    fn corrupt_challenge_skipped_in_list() {
        let mut c = Collections::default();
        c.challenges.push(ChallengeDoc {
            id: "bad".into(),
            name: "Bad".into(),
            grid: vec!["AB".into(), "C".into()],
            solutions: vec![],
            user_id: None,
            created_at: 0,
        });
        assert!(c.list_challenges(None).is_empty());
        assert!(matches!(c.get_challenge("bad"), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn non_square_challenge_is_corrupt() {
        let mut c = Collections::default();
        c.challenges.push(ChallengeDoc {
            id: "wide".into(),
            name: "Wide".into(),
            grid: vec!["ABCDEFG".into(), "HIJKLMN".into()],
            solutions: vec![],
            user_id: None,
            created_at: 0,
        });
        assert!(c.list_challenges(None).is_empty());
        match c.get_challenge("wide") {
            Err(StoreError::Corrupt(msg)) => assert!(msg.contains("square")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn submissions_merge_into_leaderboard() {
        let mut c = Collections::default();
        assert_eq!(c.submit_score(&sub("u1", 10), 1), MergeResult::Inserted);
        assert_eq!(c.submit_score(&sub("u1", 7), 2), MergeResult::Kept);
        assert_eq!(c.submit_score(&sub("u2", 12), 3), MergeResult::Inserted);
        assert_eq!(c.submit_score(&sub("u1", 15), 4), MergeResult::Raised);

        assert_eq!(c.scores.len(), 4);
        let board = c.leaderboard("c1", 10);
        assert_eq!(board.len(), 2);
        assert_eq!((board[0].user_id.as_str(), board[0].score), ("u1", 15));
        assert_eq!((board[1].user_id.as_str(), board[1].score), ("u2", 12));
        assert_eq!(c.leaderboard("c1", 1).len(), 1);
        assert!(c.leaderboard("other", 10).is_empty());
    }

    #[test]
    fn high_score_reads_scores() {
        let mut c = Collections::default();
        assert!(c.high_score("c1").is_none());
        c.submit_score(&sub("u1", 4), 1);
        c.submit_score(&sub("u2", 9), 2);
        c.submit_score(&sub("u3", 9), 3);
        let best = c.high_score("c1").unwrap();
        assert_eq!(best.user_id, "u2");
        assert_eq!(best.score, 9);
    }
}
