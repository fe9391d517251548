/// Session: one game's state machine.
///
/// ## States
///   - `Stopped`: initial and terminal. No ticks are delivered.
///   - `Started`: grid and solutions fixed, guesses and ticks accepted.
///
/// `start` resets everything derived from the previous game. `stop`
/// recomputes the missed words and, for a challenge with a signed-in
/// player, queues a final score submission. A second `stop` is a no-op.
///
/// Submissions leave as `SessionEvent`s; the session never waits on them
/// and nothing here changes if they fail.

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;

use super::event::SessionEvent;
use super::ticker::Ticker;
use crate::domain::grid::{self, Grid};
use crate::domain::guess::{self, GuessOutcome};
use crate::domain::solver::{self, SolutionMode};
use crate::identity::User;
use crate::store::{Challenge, ScoreSubmission};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Stopped,
    Started,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionError {
    NotStarted,
    AlreadyStarted,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "no game in progress"),
            Self::AlreadyStarted => write!(f, "a game is already in progress"),
        }
    }
}

impl std::error::Error for SessionError {}

pub struct Session {
    state: GameState,
    grid: Grid,
    solutions: Vec<String>,
    found: Vec<String>,
    missed: Vec<String>,
    elapsed: u64,
    mode: SolutionMode,
    challenge: Option<Challenge>,
    user: Option<User>,

    reference: Vec<String>,
    auto_submit_every: usize,
    ticker: Ticker,
    /// Submissions queued this game.
    seq: u64,
    events: Vec<SessionEvent>,
}

// ── Construction ──

impl Session {
    pub fn new(reference: Vec<String>, auto_submit_every: usize, tick_period: Duration) -> Self {
        Session {
            state: GameState::Stopped,
            grid: Grid::default(),
            solutions: vec![],
            found: vec![],
            missed: vec![],
            elapsed: 0,
            mode: SolutionMode::Freeplay,
            challenge: None,
            user: None,
            reference,
            auto_submit_every: auto_submit_every.max(1),
            ticker: Ticker::new(tick_period),
            seq: 0,
            events: vec![],
        }
    }
}

// ── Queries ──

impl Session {
    pub fn state(&self) -> GameState { self.state }
    pub fn is_started(&self) -> bool { self.state() == GameState::Started }
    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn solutions(&self) -> &[String] { &self.solutions }
    pub fn found(&self) -> &[String] { &self.found }
    pub fn missed(&self) -> &[String] { &self.missed }
    pub fn elapsed(&self) -> u64 { self.elapsed }
    pub fn mode(&self) -> SolutionMode { self.mode }
    pub fn challenge(&self) -> Option<&Challenge> { self.challenge.as_ref() }
    pub fn score(&self) -> u32 { self.found.len() as u32 }
    pub fn timer_active(&self) -> bool { self.ticker.is_active() }

    /// Drain events produced since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

// ── Transitions ──

impl Session {
    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Begin a game. With a challenge, its grid and list are used as-is;
    /// otherwise a fresh `size`×`size` grid is generated and solved.
    pub fn start(
        &mut self,
        size: usize,
        challenge: Option<Challenge>,
        rng: &mut impl Rng,
        now: Instant,
    ) -> Result<(), SessionError> {
        if self.is_started() {
            return Err(SessionError::AlreadyStarted);
        }

        match challenge {
            Some(c) => {
                self.grid = c.grid.clone();
                self.solutions = solver::resolve_challenge(&c.solutions);
                self.mode = SolutionMode::Challenge;
                self.challenge = Some(c);
            }
            None => {
                self.grid = Grid::generate(grid::clamp_size(size), rng);
                self.solutions = solver::resolve_freeplay(&self.grid, &self.reference);
                self.mode = SolutionMode::Freeplay;
                self.challenge = None;
            }
        }

        self.found.clear();
        self.missed = self.solutions.clone();
        self.elapsed = 0;
        self.seq = 0;
        self.state = GameState::Started;
        self.ticker.start(now);

        log::info!(
            "game started: {}x{} grid, {} solutions, {:?} mode",
            self.grid.size(), self.grid.size(), self.solutions.len(), self.mode,
        );
        self.events.push(SessionEvent::Started {
            size: self.grid.size(),
            solutions: self.solutions.len(),
            challenge: self.challenge.as_ref().map(|c| c.name.clone()),
        });
        Ok(())
    }

    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessOutcome, SessionError> {
        if !self.is_started() {
            return Err(SessionError::NotStarted);
        }

        let outcome = guess::evaluate(raw, &mut self.found, &self.solutions);
        self.events.push(SessionEvent::Guessed { word: guess::normalize(raw), outcome });

        if outcome == GuessOutcome::Correct {
            let count = self.found.len();
            if count % self.auto_submit_every == 0 {
                if let Some(sub) = self.submission() {
                    log::info!("auto-submitting score {} (#{})", sub.score, sub.seq);
                    self.events.push(SessionEvent::AutoSubmit(sub));
                }
            }
            if count == self.solutions.len() {
                self.events.push(SessionEvent::AllFound);
            }
        }
        Ok(outcome)
    }

    pub fn tick(&mut self) -> Result<(), SessionError> {
        if !self.is_started() {
            return Err(SessionError::NotStarted);
        }
        self.elapsed += 1;
        Ok(())
    }

    /// Deliver the ticks due at `now`. Returns how many were applied.
    pub fn advance(&mut self, now: Instant) -> u32 {
        if !self.is_started() {
            return 0;
        }
        let due = self.ticker.poll(now);
        for _ in 0..due {
            // Started was checked above and ticks cannot stop the game.
            let _ = self.tick();
        }
        due
    }

    /// End the game. Returns false when there was no game to stop.
    pub fn stop(&mut self) -> bool {
        if !self.is_started() {
            return false;
        }
        self.ticker.cancel();
        self.state = GameState::Stopped;
        self.missed = self
            .solutions
            .iter()
            .filter(|w| !self.found.contains(w))
            .cloned()
            .collect();

        log::info!(
            "game stopped: {} found, {} missed, {}s",
            self.found.len(), self.missed.len(), self.elapsed,
        );
        self.events.push(SessionEvent::Stopped {
            found: self.found.len(),
            missed: self.missed.len(),
            elapsed: self.elapsed,
        });

        if !self.found.is_empty() {
            if let Some(sub) = self.submission() {
                self.events.push(SessionEvent::FinalSubmit(sub));
            }
        }
        true
    }

    /// Build a submission for the current state, if a challenge is loaded
    /// and someone is signed in.
    fn submission(&mut self) -> Option<ScoreSubmission> {
        let challenge = self.challenge.as_ref()?;
        let Some(user) = self.user.as_ref() else {
            log::debug!("not signed in; score for {} not submitted", challenge.id);
            return None;
        };
        self.seq += 1;
        Some(ScoreSubmission {
            challenge_id: challenge.id.clone(),
            user_id: user.id.clone(),
            user_name: user.label().to_string(),
            score: self.found.len() as u32,
            words_found: self.found.clone(),
            elapsed_secs: self.elapsed,
            seq: self.seq,
        })
    }
}
