/// Background score submitter.
///
/// Submissions are queued to a worker thread and never block the frame
/// loop. Each result comes back as a `SubmitNotice` for the status line;
/// a failure is reported and otherwise dropped (no retry). Dropping the
/// submitter closes the queue and joins the worker once it drains.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::store::{ScoreSubmission, SharedStore, StoreError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitNotice {
    Saved { score: u32, seq: u64 },
    Failed { score: u32, seq: u64, error: StoreError },
}

impl SubmitNotice {
    pub fn message(&self) -> String {
        match self {
            SubmitNotice::Saved { score, seq } => format!("Score {score} saved (#{seq})"),
            SubmitNotice::Failed { score, seq, error } => {
                format!("Score {score} not saved (#{seq}): {error}")
            }
        }
    }
}

pub struct Submitter {
    queue: Option<Sender<ScoreSubmission>>,
    notices: Receiver<SubmitNotice>,
    worker: Option<JoinHandle<()>>,
}

impl Submitter {
    pub fn spawn(store: SharedStore) -> Self {
        let (queue, jobs) = mpsc::channel::<ScoreSubmission>();
        let (notify, notices) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("score-submitter".into())
            .spawn(move || {
                for sub in jobs {
                    let notice = match store.submit_score(&sub) {
                        Ok(()) => {
                            log::info!("submitted score {} for {} (#{})", sub.score, sub.challenge_id, sub.seq);
                            SubmitNotice::Saved { score: sub.score, seq: sub.seq }
                        }
                        Err(error) => {
                            log::error!("score submission #{} failed: {error}", sub.seq);
                            SubmitNotice::Failed { score: sub.score, seq: sub.seq, error }
                        }
                    };
                    if notify.send(notice).is_err() {
                        break;
                    }
                }
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("could not start submitter thread: {e}");
                None
            }
        };

        Submitter { queue: worker.as_ref().map(|_| queue), notices, worker }
    }

    /// Queue a submission. Never blocks.
    pub fn submit(&self, sub: ScoreSubmission) {
        let Some(queue) = &self.queue else {
            log::error!("submitter not running; score #{} dropped", sub.seq);
            return;
        };
        if let Err(e) = queue.send(sub) {
            log::error!("submitter queue closed; score #{} dropped", e.0.seq);
        }
    }

    /// Results that have arrived since the last poll.
    pub fn poll(&self) -> Vec<SubmitNotice> {
        self.notices.try_iter().collect()
    }
}

impl Drop for Submitter {
    fn drop(&mut self) {
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore, Unconfigured};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn sub(score: u32, seq: u64) -> ScoreSubmission {
        ScoreSubmission {
            challenge_id: "c".into(),
            user_id: "u".into(),
            user_name: "U".into(),
            score,
            words_found: vec![],
            elapsed_secs: 1,
            seq,
        }
    }

    fn wait_for(submitter: &Submitter, n: usize) -> Vec<SubmitNotice> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = vec![];
        while got.len() < n && Instant::now() < deadline {
            got.extend(submitter.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        got
    }

    #[test]
    fn submissions_reach_store() {
        let store = Arc::new(MemoryStore::new());
        let submitter = Submitter::spawn(store.clone());
        submitter.submit(sub(5, 1));
        submitter.submit(sub(3, 2));
        submitter.submit(sub(8, 3));

        let notices = wait_for(&submitter, 3);
        assert_eq!(notices.len(), 3);
        assert!(notices.iter().all(|n| matches!(n, SubmitNotice::Saved { .. })));
        assert_eq!(store.get_leaderboard("c", 5).unwrap()[0].score, 8);
    }

    #[test]
    fn failures_come_back_as_notices() {
        let submitter = Submitter::spawn(Arc::new(Unconfigured));
        submitter.submit(sub(5, 1));
        let notices = wait_for(&submitter, 1);
        assert_eq!(
            notices,
            vec![SubmitNotice::Failed { score: 5, seq: 1, error: StoreError::NotConfigured }]
        );
        assert!(notices[0].message().starts_with("Score 5 not saved (#1): "));
    }

    #[test]
    fn saved_notice_names_submission() {
        let notice = SubmitNotice::Saved { score: 12, seq: 3 };
        assert_eq!(notice.message(), "Score 12 saved (#3)");
    }

    #[test]
    fn drop_drains_queue() {
        let store = Arc::new(MemoryStore::new());
        {
            let submitter = Submitter::spawn(store.clone());
            for i in 1..=10 {
                submitter.submit(sub(i, i as u64));
            }
        }
        assert_eq!(store.get_leaderboard("c", 5).unwrap()[0].score, 10);
    }
}
