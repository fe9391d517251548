/// Sample challenge seeding.
///
/// Creates the fixed sample set one by one. A failure on one challenge is
/// logged and counted; the rest of the batch still runs.

use super::DocumentStore;
use crate::domain::grid::Grid;

pub struct SampleChallenge {
    pub name: &'static str,
    pub rows: &'static [&'static str],
    pub solutions: &'static [&'static str],
}

pub const SAMPLE_CHALLENGES: &[SampleChallenge] = &[
    SampleChallenge {
        name: "Easy Challenge",
        rows: &["CATS", "DOGS", "BATS", "CUPS"],
        solutions: &["CAT", "DOG", "BAT", "CUP", "CATS", "DOGS", "BATS", "CUPS"],
    },
    SampleChallenge {
        name: "Medium Challenge",
        rows: &["HELLO", "WORLD", "HEART", "BOARD", "WORDS"],
        solutions: &["HELLO", "WORLD", "HEART", "BOARD", "WORDS", "HEAR", "BOAR", "WORD"],
    },
    SampleChallenge {
        name: "Hard Challenge",
        rows: &["PROGRAM", "CHALLEN", "GEBOGGL", "EWITHFI", "REACTJS", "APPLICA", "TIONSTS"],
        solutions: &["PROGRAM", "CHALLENGE", "BOGGLE", "REACT", "APPLICATION"],
    },
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub created: Vec<String>,
    pub failures: usize,
}

pub fn populate(store: &dyn DocumentStore, owner: Option<&str>) -> PopulateReport {
    populate_with(store, SAMPLE_CHALLENGES, owner)
}

pub fn populate_with(store: &dyn DocumentStore, samples: &[SampleChallenge], owner: Option<&str>) -> PopulateReport {
    let mut report = PopulateReport::default();

    for sample in samples {
        let grid = match Grid::from_rows(sample.rows) {
            Ok(g) => g,
            Err(e) => {
                log::error!("sample {:?} has a bad grid: {e}", sample.name);
                report.failures += 1;
                continue;
            }
        };
        let solutions: Vec<String> = sample.solutions.iter().map(|s| s.to_string()).collect();
        match store.create_challenge(sample.name, &grid, &solutions, owner) {
            Ok(id) => {
                log::info!("created challenge {:?} with id {id}", sample.name);
                report.created.push(id);
            }
            Err(e) => {
                log::error!("creating challenge {:?} failed: {e}", sample.name);
                report.failures += 1;
            }
        }
    }

    log::info!("populate: {} created, {} failed", report.created.len(), report.failures);
    report
}
