/// Guess evaluation.
///
/// A guess is uppercased (no other normalization) and classified against
/// the found list first, then the solution list. Only a correct guess
/// mutates state: it is appended to the found list.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GuessOutcome {
    Duplicate,
    Correct,
    Incorrect,
}

pub fn normalize(raw: &str) -> String {
    raw.to_uppercase()
}

/// Classify `raw` and, when correct, append it to `found`.
pub fn evaluate(raw: &str, found: &mut Vec<String>, solutions: &[String]) -> GuessOutcome {
    let guess = normalize(raw);
    if found.contains(&guess) {
        GuessOutcome::Duplicate
    } else if solutions.contains(&guess) {
        found.push(guess);
        GuessOutcome::Correct
    } else {
        GuessOutcome::Incorrect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solutions() -> Vec<String> {
        vec!["CAT".into(), "DOG".into()]
    }

    #[test]
    fn correct_then_duplicate() {
        let sol = solutions();
        let mut found = vec![];
        assert_eq!(evaluate("cat", &mut found, &sol), GuessOutcome::Correct);
        assert_eq!(found, vec!["CAT"]);
        assert_eq!(evaluate("CAT", &mut found, &sol), GuessOutcome::Duplicate);
        assert_eq!(found, vec!["CAT"]);
    }

    #[test]
    fn incorrect_leaves_state() {
        let sol = solutions();
        let mut found = vec!["DOG".to_string()];
        assert_eq!(evaluate("ZZZ", &mut found, &sol), GuessOutcome::Incorrect);
        assert_eq!(found, vec!["DOG"]);
    }

    #[test]
    fn whitespace_is_not_trimmed() {
        let sol = solutions();
        let mut found = vec![];
        assert_eq!(evaluate(" cat", &mut found, &sol), GuessOutcome::Incorrect);
        assert!(found.is_empty());
    }

    #[test]
    fn insertion_order_kept() {
        let sol = solutions();
        let mut found = vec![];
        evaluate("dog", &mut found, &sol);
        evaluate("cat", &mut found, &sol);
        assert_eq!(found, vec!["DOG", "CAT"]);
    }
}
