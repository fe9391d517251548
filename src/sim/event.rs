/// Events emitted by the session.
/// The frame loop consumes these: submissions go to the background
/// submitter, the rest only drive on-screen messages.

use crate::domain::guess::GuessOutcome;
use crate::store::ScoreSubmission;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Started { size: usize, solutions: usize, challenge: Option<String> },
    Guessed { word: String, outcome: GuessOutcome },
    AllFound,
    Stopped { found: usize, missed: usize, elapsed: u64 },
    /// Intermediate submission after every N found words.
    AutoSubmit(ScoreSubmission),
    /// Final submission on stop.
    FinalSubmit(ScoreSubmission),
}

impl SessionEvent {
    pub fn submission(&self) -> Option<&ScoreSubmission> {
        match self {
            SessionEvent::AutoSubmit(s) | SessionEvent::FinalSubmit(s) => Some(s),
            _ => None,
        }
    }
}
