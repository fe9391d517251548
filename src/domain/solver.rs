/// Solution resolution: which words count as answers for a grid.
///
/// Freeplay uses a letter-presence filter over a reference list: a word
/// qualifies when each of its letters appears somewhere in the grid.
/// Repeated letters need only one occurrence and adjacency is not checked.
/// Challenges carry their own authoritative list and skip the filter.

use super::grid::Grid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolutionMode {
    Freeplay,
    Challenge,
}

/// Subsequence of `reference` whose letters all appear in the grid.
pub fn resolve_freeplay(grid: &Grid, reference: &[String]) -> Vec<String> {
    if grid.is_empty() {
        return vec![];
    }
    let letters = grid.letters();
    reference
        .iter()
        .filter(|w| w.chars().all(|c| letters.contains(&c)))
        .cloned()
        .collect()
}

/// A challenge's list is used as-is.
pub fn resolve_challenge(solutions: &[String]) -> Vec<String> {
    solutions.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wordlist;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn is_discoverable(grid: &Grid, word: &str) -> bool {
        let letters = grid.letters();
        word.chars().all(|c| letters.contains(&c))
    }

    fn sample_grid() -> Grid {
        // Letters: C A T S D O G U P H K E Y R J M
        Grid::from_rows(&["CATS", "DOGU", "PHKE", "YRJM"]).unwrap()
    }

    #[test]
    fn freeplay_matches_predicate() {
        let grid = sample_grid();
        let reference = wordlist::builtin();
        let solved = resolve_freeplay(&grid, &reference);
        let letters = grid.letters();

        for word in &reference {
            let expected = word.chars().all(|c| letters.contains(&c));
            assert_eq!(solved.contains(word), expected, "word {word}");
        }
        // Order is the reference order
        let positions: Vec<usize> = solved
            .iter()
            .map(|w| reference.iter().position(|r| r == w).unwrap())
            .collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn freeplay_excludes_missing_letters() {
        let grid = Grid::from_rows(&["CATS", "DGUP", "HKEY", "RRRR"]).unwrap();
        let solved = resolve_freeplay(&grid, &wordlist::builtin());
        assert!(solved.contains(&"CAT".to_string()));
        assert!(solved.contains(&"YARD".to_string()));
        assert!(!solved.contains(&"DOG".to_string())); // no O
        assert!(!solved.contains(&"JUMP".to_string())); // no J, no M
    }

    #[test]
    fn repeated_letters_need_one_occurrence() {
        let grid = Grid::from_rows(&["ABCD", "EFGH", "IJKL", "MNOP"]).unwrap();
        let reference = vec!["ADD".to_string(), "BOOK".to_string(), "ZOO".to_string()];
        assert_eq!(resolve_freeplay(&grid, &reference), vec!["ADD", "BOOK"]);
        assert!(is_discoverable(&grid, "ADD"));
        assert!(!is_discoverable(&grid, "ZOO"));
    }

    #[test]
    fn empty_grid_has_no_solutions() {
        let grid = Grid::default();
        assert!(resolve_freeplay(&grid, &wordlist::builtin()).is_empty());
    }

    #[test]
    fn random_grids_respect_predicate() {
        let mut rng = StdRng::seed_from_u64(42);
        let reference = wordlist::builtin();
        for n in 4..=7 {
            let grid = Grid::generate(n, &mut rng);
            let solved = resolve_freeplay(&grid, &reference);
            for word in &reference {
                assert_eq!(solved.contains(word), is_discoverable(&grid, word));
            }
        }
    }

    #[test]
    fn challenge_list_is_authoritative() {
        let list = vec!["CATS".to_string(), "QUIZ".to_string()];
        assert_eq!(resolve_challenge(&list), list);
    }
}
