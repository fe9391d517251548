/// File-backed document store.
///
/// Each collection is a JSON array in its own file under the data
/// directory. A call loads only the collections it needs, applies the
/// change and writes back whatever it touched, so a damaged file only
/// affects the operations that read it. Writes go to a temp file first and are renamed
/// into place. A store-wide mutex serializes calls from this process.
///
/// A missing file reads as an empty collection.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::collections::Collections;
use super::{now_secs, Challenge, DocumentStore, LeaderboardEntry, ScoreSubmission, StoreError};
use crate::domain::grid::Grid;

const CHALLENGES_FILE: &str = "challenges.json";
const SCORES_FILE: &str = "scores.json";
const LEADERBOARD_FILE: &str = "leaderboard.json";

pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        FileStore { dir, lock: Mutex::new(()) }
    }

    fn load(&self, parts: &[Part]) -> Result<Collections, StoreError> {
        let mut data = Collections::default();
        for part in parts {
            match part {
                Part::Challenges => data.challenges = read_collection(&self.dir.join(CHALLENGES_FILE))?,
                Part::Scores => data.scores = read_collection(&self.dir.join(SCORES_FILE))?,
                Part::Leaderboard => data.leaderboard = read_collection(&self.dir.join(LEADERBOARD_FILE))?,
            }
        }
        Ok(data)
    }

    /// Run `f` under the store lock against freshly loaded `parts`.
    /// Collections not named stay empty.
    fn with_data<R>(
        &self,
        parts: &[Part],
        f: impl FnOnce(&mut Collections) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut data = self.load(parts)?;
        f(&mut data)
    }
}

#[derive(Clone, Copy, Debug)]
enum Part {
    Challenges,
    Scores,
    Leaderboard,
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(vec![]),
        Ok(text) => serde_json::from_str(&text)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
        Err(e) => Err(StoreError::Io(format!("{}: {e}", path.display()))),
    }
}

fn write_collection<T: Serialize>(dir: &Path, name: &str, docs: &[T]) -> Result<(), StoreError> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(docs)
        .map_err(|e| StoreError::Io(format!("encode {name}: {e}")))?;
    let tmp = dir.join(format!("{name}.tmp"));
    fs::write(&tmp, json)?;
    fs::rename(&tmp, dir.join(name))?;
    Ok(())
}

impl DocumentStore for FileStore {
    fn list_challenges(&self, owner: Option<&str>) -> Result<Vec<Challenge>, StoreError> {
        self.with_data(&[Part::Challenges], |data| Ok(data.list_challenges(owner)))
    }

    fn get_challenge(&self, id: &str) -> Result<Challenge, StoreError> {
        self.with_data(&[Part::Challenges], |data| data.get_challenge(id))
    }

    fn create_challenge(
        &self,
        name: &str,
        grid: &Grid,
        solutions: &[String],
        owner: Option<&str>,
    ) -> Result<String, StoreError> {
        let id = self.with_data(&[Part::Challenges], |data| {
            let id = data.create_challenge(name, grid, solutions, owner, now_secs());
            write_collection(&self.dir, CHALLENGES_FILE, &data.challenges)?;
            Ok(id)
        })?;
        log::debug!("created challenge {name:?} as {id}");
        Ok(id)
    }

    fn submit_score(&self, sub: &ScoreSubmission) -> Result<(), StoreError> {
        let merged = self.with_data(&[Part::Scores, Part::Leaderboard], |data| {
            let merged = data.submit_score(sub, now_secs());
            write_collection(&self.dir, SCORES_FILE, &data.scores)?;
            write_collection(&self.dir, LEADERBOARD_FILE, &data.leaderboard)?;
            Ok(merged)
        })?;
        log::debug!("score {} for {} on {}: {merged:?}", sub.score, sub.user_id, sub.challenge_id);
        Ok(())
    }

    fn get_leaderboard(&self, challenge_id: &str, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.with_data(&[Part::Leaderboard], |data| Ok(data.leaderboard(challenge_id, limit)))
    }

    fn get_high_score(&self, challenge_id: &str) -> Option<LeaderboardEntry> {
        match self.with_data(&[Part::Scores], |data| Ok(data.high_score(challenge_id))) {
            Ok(best) => best,
            Err(e) => {
                log::warn!("high score lookup for {challenge_id} failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boards;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn sub(user: &str, score: u32) -> ScoreSubmission {
        ScoreSubmission {
            challenge_id: "c".into(),
            user_id: user.into(),
            user_name: format!("Player {user}"),
            score,
            words_found: vec!["CAT".into()],
            elapsed_secs: 12,
            seq: 3,
        }
    }

    #[test]
    fn empty_dir_reads_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.list_challenges(None).unwrap().is_empty());
        assert!(store.get_leaderboard("c", 5).unwrap().is_empty());
        assert!(store.get_high_score("c").is_none());
        assert_eq!(store.get_challenge("x"), Err(StoreError::NotFound("x".into())));
    }

    #[test]
    fn challenge_grid_stored_as_rows() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        let grid = Grid::from_rows(&["CATS", "DOGS", "BATS", "CUPS"]).unwrap();
        let id = store
            .create_challenge("Easy", &grid, &["CAT".to_string(), "DOGS".to_string()], None)
            .unwrap();

        let raw = fs::read_to_string(dir.path().join(CHALLENGES_FILE)).unwrap();
        let docs: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(docs[0]["grid"], serde_json::json!(["CATS", "DOGS", "BATS", "CUPS"]));
        assert!(docs[0].get("userId").is_none());

        // A second store over the same directory sees the same data
        let reopened = FileStore::new(dir.path().to_path_buf());
        let c = reopened.get_challenge(&id).unwrap();
        assert_eq!(c.grid, grid);
        assert_eq!(c.solutions, vec!["CAT", "DOGS"]);
    }

    #[test]
    fn scores_persist_with_max_merge() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.submit_score(&sub("u1", 10)).unwrap();
        store.submit_score(&sub("u1", 7)).unwrap();
        store.submit_score(&sub("u2", 3)).unwrap();

        let reopened = FileStore::new(dir.path().to_path_buf());
        let board = reopened.get_leaderboard("c", 10).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].score, 10);
        assert_eq!(board[0].user_name, "Player u1");

        store.submit_score(&sub("u1", 15)).unwrap();
        assert_eq!(reopened.get_leaderboard("c", 10).unwrap()[0].score, 15);

        let raw = fs::read_to_string(dir.path().join(SCORES_FILE)).unwrap();
        let docs: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(docs.as_array().unwrap().len(), 4);
        assert_eq!(docs[0]["totalTime"], 12);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LEADERBOARD_FILE), "{not json").unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(matches!(store.get_leaderboard("c", 5), Err(StoreError::Corrupt(_))));
        assert!(store.get_high_score("c").is_none());
    }

    #[test]
    fn corrupt_challenges_leave_scores_usable() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.submit_score(&sub("u1", 9)).unwrap();
        fs::write(dir.path().join(CHALLENGES_FILE), "{oops").unwrap();

        assert!(matches!(store.list_challenges(None), Err(StoreError::Corrupt(_))));
        let board = store.get_leaderboard("c", 5).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].score, 9);
        assert!(!board[0].is_demo);

        let mut rng = StdRng::seed_from_u64(1);
        let rows = boards::leaderboard_with_demo(&store, "c", 5, &mut rng).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_demo);

        store.submit_score(&sub("u1", 12)).unwrap();
        assert_eq!(store.get_leaderboard("c", 5).unwrap()[0].score, 12);
        assert_eq!(store.get_high_score("c").map(|e| e.score), Some(12));
    }

    #[test]
    fn corrupt_scores_leave_challenges_usable() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        fs::write(dir.path().join(SCORES_FILE), "[1, 2").unwrap();
        let grid = Grid::from_rows(&["CATS", "DOGS", "BATS", "CUPS"]).unwrap();
        let id = store.create_challenge("Easy", &grid, &[], None).unwrap();
        assert_eq!(store.get_challenge(&id).unwrap().name, "Easy");
        assert!(store.get_high_score(&id).is_none());
        assert!(store.submit_score(&sub("u1", 3)).is_err());
    }
}
