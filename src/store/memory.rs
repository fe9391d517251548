/// Process-local store. Same semantics as the file store, nothing persisted.

use std::sync::{Mutex, MutexGuard};

use super::collections::Collections;
use super::{now_secs, Challenge, DocumentStore, LeaderboardEntry, ScoreSubmission, StoreError};
use crate::domain::grid::Grid;

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn data(&self) -> MutexGuard<'_, Collections> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    fn list_challenges(&self, owner: Option<&str>) -> Result<Vec<Challenge>, StoreError> {
        Ok(self.data().list_challenges(owner))
    }

    fn get_challenge(&self, id: &str) -> Result<Challenge, StoreError> {
        self.data().get_challenge(id)
    }

    fn create_challenge(
        &self,
        name: &str,
        grid: &Grid,
        solutions: &[String],
        owner: Option<&str>,
    ) -> Result<String, StoreError> {
        let id = self.data().create_challenge(name, grid, solutions, owner, now_secs());
        log::debug!("created challenge {name:?} as {id}");
        Ok(id)
    }

    fn submit_score(&self, sub: &ScoreSubmission) -> Result<(), StoreError> {
        let merged = self.data().submit_score(sub, now_secs());
        log::debug!("score {} for {} on {}: {merged:?}", sub.score, sub.user_id, sub.challenge_id);
        Ok(())
    }

    fn get_leaderboard(&self, challenge_id: &str, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(self.data().leaderboard(challenge_id, limit))
    }

    fn get_high_score(&self, challenge_id: &str) -> Option<LeaderboardEntry> {
        self.data().high_score(challenge_id)
    }
}
