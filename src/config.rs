/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or
/// `~/.local/share/wordgrid`. Falls back to sensible defaults if the file
/// is missing or incomplete. The resulting `GameConfig` is handed to the
/// store and identity collaborators at construction.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::grid;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub game: PlayConfig,
    pub store: StoreConfig,
    pub player: Option<PlayerProfile>,
    pub leaderboard: LeaderboardConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct PlayConfig {
    pub grid_size: usize,
    pub tick_ms: u64,
    pub word_list: Option<PathBuf>,
    pub auto_submit_every: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    File,
    Memory,
    None,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn is_configured(&self) -> bool {
        self.backend != StoreBackend::None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LeaderboardConfig {
    pub limit: usize,
    pub global_limit: usize,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    store: TomlStore,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    leaderboard: TomlLeaderboard,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_grid_size")]
    grid_size: usize,
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
    #[serde(default)]
    word_list: String,
    #[serde(default = "default_auto_submit")]
    auto_submit_every: usize,
}

#[derive(Deserialize, Debug)]
struct TomlStore {
    #[serde(default = "default_backend")]
    backend: StoreBackend,
    #[serde(default)]
    data_dir: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlPlayer {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    photo_url: String,
}

#[derive(Deserialize, Debug)]
struct TomlLeaderboard {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default = "default_global_limit")]
    global_limit: usize,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

// ── Defaults ──

fn default_grid_size() -> usize { 4 }
fn default_tick_ms() -> u64 { 1000 }
fn default_auto_submit() -> usize { 5 }
fn default_backend() -> StoreBackend { StoreBackend::File }
fn default_limit() -> usize { 10 }
fn default_global_limit() -> usize { 5 }
fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "wordgrid.log".into() }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            grid_size: default_grid_size(),
            tick_ms: default_tick_ms(),
            word_list: String::new(),
            auto_submit_every: default_auto_submit(),
        }
    }
}

impl Default for TomlStore {
    fn default() -> Self {
        TomlStore { backend: default_backend(), data_dir: String::new() }
    }
}

impl Default for TomlLeaderboard {
    fn default() -> Self {
        TomlLeaderboard { limit: default_limit(), global_limit: default_global_limit() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { level: default_log_level(), file: default_log_file() }
    }
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) CWD, (3) XDG data home.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, data_dir())
    }

    /// Parse config text directly. Used by tests and for diagnostics.
    #[cfg(test)]
    pub fn parse_str(text: &str, default_data: PathBuf) -> Result<Self, toml::de::Error> {
        Ok(Self::from_toml(toml::from_str(text)?, default_data))
    }

    fn from_toml(t: TomlConfig, default_data: PathBuf) -> Self {
        let data_dir = non_empty(t.store.data_dir).map(PathBuf::from).unwrap_or(default_data);

        let player = non_empty(t.player.id).map(|id| PlayerProfile {
            id,
            name: non_empty(t.player.name),
            email: non_empty(t.player.email),
            photo_url: non_empty(t.player.photo_url),
        });

        let log_file = PathBuf::from(&t.log.file);
        let log_file = if log_file.is_absolute() { log_file } else { data_dir.join(log_file) };

        GameConfig {
            game: PlayConfig {
                grid_size: grid::clamp_size(t.game.grid_size),
                tick_ms: t.game.tick_ms.max(1),
                word_list: non_empty(t.game.word_list).map(PathBuf::from),
                auto_submit_every: t.game.auto_submit_every.max(1),
            },
            store: StoreConfig { backend: t.store.backend, data_dir },
            player,
            leaderboard: LeaderboardConfig {
                limit: t.leaderboard.limit.max(1),
                global_limit: t.leaderboard.global_limit.max(1),
            },
            log: LogConfig { level: t.log.level, file: log_file },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/wordgrid");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Where store documents and the log file live unless configured otherwise.
fn data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/share/wordgrid");
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        // Logger is not up yet; config decides where it writes.
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
