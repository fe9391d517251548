/// AppState: everything the frame loop and renderer share.
///
/// The game itself lives in `session`; the rest is screen state: which
/// view is up, list cursors, the guess line and the status message.

use std::time::{Duration, Instant};

use super::boards::ChallengeBoard;
use super::session::Session;
use crate::identity::User;
use crate::store::{Challenge, LeaderboardEntry};

pub const GUESS_PROMPT: &str = "Make your first guess!";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Menu,
    Playing,
    ChallengeList,
    Leaderboard,
    GlobalBoard,
}

/// A challenge row in the picker, with its best recorded score if known.
#[derive(Clone, Debug)]
pub struct ChallengeRow {
    pub challenge: Challenge,
    pub high_score: Option<LeaderboardEntry>,
}

pub struct AppState {
    pub screen: Screen,
    pub session: Session,
    pub grid_size: usize,
    pub user: Option<User>,
    pub store_ready: bool,
    /// A player profile exists to sign in with.
    pub identity_ready: bool,

    // ── Playing ──
    pub input: String,
    pub feedback: String,

    // ── Challenge picker ──
    pub challenges: Vec<ChallengeRow>,
    pub cursor: usize,
    pub scroll: usize,

    // ── Leaderboards ──
    pub board_title: String,
    pub board: Vec<LeaderboardEntry>,
    /// Where Esc goes from the leaderboard view.
    pub board_return: Screen,
    pub global: Vec<ChallengeBoard>,
    pub global_scroll: usize,

    // ── Status line ──
    pub message: String,
    message_until: Option<Instant>,
}

impl AppState {
    pub fn new(session: Session, grid_size: usize, store_ready: bool) -> Self {
        AppState {
            screen: Screen::Menu,
            session,
            grid_size,
            user: None,
            store_ready,
            identity_ready: false,
            input: String::new(),
            feedback: GUESS_PROMPT.to_string(),
            challenges: vec![],
            cursor: 0,
            scroll: 0,
            board_title: String::new(),
            board: vec![],
            board_return: Screen::Menu,
            global: vec![],
            global_scroll: 0,
            message: String::new(),
            message_until: None,
        }
    }

    /// Show `msg` on the status line. `None` keeps it until replaced.
    pub fn set_message(&mut self, msg: &str, duration: Option<Duration>) {
        self.message = msg.to_string();
        self.message_until = duration.map(|d| Instant::now() + d);
    }

    pub fn expire_message(&mut self, now: Instant) {
        if self.message_until.is_some_and(|t| now >= t) {
            self.message.clear();
            self.message_until = None;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.challenges.len() {
            self.cursor += 1;
        }
    }

    /// Keep the cursor inside a window of `visible` rows.
    pub fn clamp_scroll(&mut self, visible: usize) {
        let visible = visible.max(1);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + visible {
            self.scroll = self.cursor + 1 - visible;
        }
    }

    /// Challenge owner filter for the picker and the global board: the
    /// signed-in user's id, or no filter when signed out.
    pub fn owner_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn selected_challenge(&self) -> Option<&ChallengeRow> {
        self.challenges.get(self.cursor)
    }

    pub fn reset_guess_line(&mut self) {
        self.input.clear();
        self.feedback = GUESS_PROMPT.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Grid;
    use crate::domain::wordlist;

    fn app() -> AppState {
        AppState::new(Session::new(wordlist::builtin(), 5, Duration::from_secs(1)), 4, true)
    }

    fn row(i: usize) -> ChallengeRow {
        ChallengeRow {
            challenge: Challenge {
                id: format!("c{i}"),
                name: format!("Challenge {i}"),
                grid: Grid::from_rows(&["ABCD", "EFGH", "IJKL", "MNOP"]).unwrap(),
                solutions: vec![],
                owner_id: None,
                created_at: 0,
            },
            high_score: None,
        }
    }

    #[test]
    fn message_expiry() {
        let mut a = app();
        a.set_message("hello", Some(Duration::from_millis(10)));
        a.expire_message(Instant::now());
        assert_eq!(a.message, "hello");
        a.expire_message(Instant::now() + Duration::from_secs(1));
        assert!(a.message.is_empty());

        a.set_message("sticky", None);
        a.expire_message(Instant::now() + Duration::from_secs(100));
        assert_eq!(a.message, "sticky");
    }

    #[test]
    fn cursor_and_scroll() {
        let mut a = app();
        a.challenges = (0..6).map(row).collect();
        a.cursor_up();
        assert_eq!(a.cursor, 0);
        for _ in 0..10 {
            a.cursor_down();
            a.clamp_scroll(3);
        }
        assert_eq!(a.cursor, 5);
        assert_eq!(a.scroll, 3);
        assert_eq!(a.selected_challenge().unwrap().challenge.id, "c5");
        for _ in 0..4 {
            a.cursor_up();
            a.clamp_scroll(3);
        }
        assert_eq!(a.cursor, 1);
        assert_eq!(a.scroll, 1);
    }

    #[test]
    fn owner_filter_follows_sign_in() {
        let mut a = app();
        assert_eq!(a.owner_id(), None);
        a.user = Some(User {
            id: "p1".into(),
            display_name: Some("Pat".into()),
            email: None,
            photo_url: None,
        });
        assert_eq!(a.owner_id(), Some("p1"));
    }
}
