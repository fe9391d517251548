/// Document store: challenges, score records and the per-challenge leaderboard.
///
/// ## Collections
///   - `challenges`: named grids with their authoritative solution lists
///   - `scores`: every submission, append-only
///   - `leaderboard`: one retained best entry per (challenge, user)
///
/// ## Backends
///   - `FileStore`: JSON documents in the data directory
///   - `MemoryStore`: process-local, used by tests and `backend = "memory"`
///   - `Unconfigured`: every call fails with `StoreError::NotConfigured`
///
/// Leaderboard writes use a max-merge (see `domain::leaderboard`), so
/// overlapping submissions for the same user converge on the best score.

pub mod collections;
pub mod file;
pub mod memory;
pub mod populate;

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{StoreBackend, StoreConfig};
use crate::domain::grid::Grid;

pub use crate::domain::leaderboard::LeaderboardEntry;

pub use file::FileStore;
pub use memory::MemoryStore;

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

/// A challenge as the game sees it: grid already rebuilt from row strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    pub id: String,
    pub name: String,
    pub grid: Grid,
    pub solutions: Vec<String>,
    pub owner_id: Option<String>,
    pub created_at: u64,
}

/// One score submission from a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub challenge_id: String,
    pub user_id: String,
    pub user_name: String,
    pub score: u32,
    pub words_found: Vec<String>,
    pub elapsed_secs: u64,
    /// Per-session submission counter; only used for tracing.
    pub seq: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// No backend configured; nothing can be read or written.
    NotConfigured,
    NotFound(String),
    /// Transient read/write failure.
    Io(String),
    /// A stored document could not be decoded.
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "store is not configured (set [store] backend in config.toml)"),
            Self::NotFound(id) => write!(f, "challenge {id} not found"),
            Self::Io(msg) => write!(f, "store I/O error: {msg}"),
            Self::Corrupt(msg) => write!(f, "corrupt store document: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

// ══════════════════════════════════════════════════════════════
// Store contract
// ══════════════════════════════════════════════════════════════

pub trait DocumentStore: Send + Sync {
    /// Capability check: can this store serve requests at all?
    fn is_configured(&self) -> bool {
        true
    }

    // ── Challenges ──

    /// All challenges, or only those owned by `owner`.
    fn list_challenges(&self, owner: Option<&str>) -> Result<Vec<Challenge>, StoreError>;
    fn get_challenge(&self, id: &str) -> Result<Challenge, StoreError>;
    /// Persist a challenge and return its new id.
    fn create_challenge(
        &self,
        name: &str,
        grid: &Grid,
        solutions: &[String],
        owner: Option<&str>,
    ) -> Result<String, StoreError>;

    // ── Scores ──

    /// Record a submission and max-merge it into the leaderboard.
    fn submit_score(&self, sub: &ScoreSubmission) -> Result<(), StoreError>;
    /// Real entries only, best score first, at most `limit`.
    fn get_leaderboard(&self, challenge_id: &str, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
    /// Best recorded score; read failures degrade to `None`.
    fn get_high_score(&self, challenge_id: &str) -> Option<LeaderboardEntry>;
}

pub type SharedStore = Arc<dyn DocumentStore>;

/// Stand-in used when no backend is configured.
pub struct Unconfigured;

impl DocumentStore for Unconfigured {
    fn is_configured(&self) -> bool {
        false
    }

    fn list_challenges(&self, _owner: Option<&str>) -> Result<Vec<Challenge>, StoreError> {
        Err(StoreError::NotConfigured)
    }

    fn get_challenge(&self, _id: &str) -> Result<Challenge, StoreError> {
        Err(StoreError::NotConfigured)
    }

    fn create_challenge(&self, _: &str, _: &Grid, _: &[String], _: Option<&str>) -> Result<String, StoreError> {
        Err(StoreError::NotConfigured)
    }

    fn submit_score(&self, _sub: &ScoreSubmission) -> Result<(), StoreError> {
        Err(StoreError::NotConfigured)
    }

    fn get_leaderboard(&self, _: &str, _: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Err(StoreError::NotConfigured)
    }

    fn get_high_score(&self, _challenge_id: &str) -> Option<LeaderboardEntry> {
        None
    }
}

/// Build the store selected by configuration.
pub fn open(cfg: &StoreConfig) -> SharedStore {
    match cfg.backend {
        StoreBackend::File => {
            log::info!("using file store at {}", cfg.data_dir.display());
            Arc::new(FileStore::new(cfg.data_dir.clone()))
        }
        StoreBackend::Memory => {
            log::info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::None => {
            log::warn!("no store backend configured; challenges and scores are unavailable");
            Arc::new(Unconfigured)
        }
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_fails_fast() {
        let store = Unconfigured;
        assert!(!store.is_configured());
        assert_eq!(store.list_challenges(None), Err(StoreError::NotConfigured));
        assert_eq!(store.get_challenge("x"), Err(StoreError::NotConfigured));
        assert_eq!(store.get_leaderboard("x", 5), Err(StoreError::NotConfigured));
        assert_eq!(store.get_high_score("x"), None);
        let grid = Grid::from_rows(&["ABCD", "EFGH", "IJKL", "MNOP"]).unwrap();
        assert_eq!(
            store.create_challenge("n", &grid, &[], None),
            Err(StoreError::NotConfigured)
        );
    }

    #[test]
    fn open_respects_backend() {
        let cfg = StoreConfig { backend: StoreBackend::None, data_dir: std::path::PathBuf::from(".") };
        assert!(!open(&cfg).is_configured());
        let cfg = StoreConfig { backend: StoreBackend::Memory, data_dir: std::path::PathBuf::from(".") };
        assert!(open(&cfg).is_configured());
    }
}
