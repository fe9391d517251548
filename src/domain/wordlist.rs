/// Reference word lists for freeplay.
///
/// The built-in list is tiny; a larger list can be loaded from a text file
/// with one word per line.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

pub const BUILTIN_WORDS: &[&str] = &[
    "CAT", "DOG", "BAT", "CUP", "HAT", "KEY", "TOY", "CARD", "JUMP", "YARD",
];

#[derive(Debug)]
pub struct WordListError {
    path: String,
    source: std::io::Error,
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not read word list {}: {}", self.path, self.source)
    }
}

impl std::error::Error for WordListError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub fn builtin() -> Vec<String> {
    words_from_slice(BUILTIN_WORDS)
}

/// Normalize a slice of words: uppercase, letters only, first occurrence wins.
pub fn words_from_slice<S: AsRef<str>>(slice: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    slice
        .iter()
        .filter_map(|s| normalize_entry(s.as_ref()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Load a word list file. Blank and non-alphabetic lines are skipped.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, WordListError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| WordListError {
        path: path.display().to_string(),
        source,
    })?;
    let lines: Vec<&str> = content.lines().collect();
    let words = words_from_slice(&lines);
    log::info!("loaded {} words from {}", words.len(), path.display());
    Ok(words)
}

fn normalize_entry(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_is_normalized() {
        let words = builtin();
        assert_eq!(words.len(), BUILTIN_WORDS.len());
        assert!(words.iter().all(|w| w.chars().all(|c| c.is_ascii_uppercase())));
    }

    #[test]
    fn slice_skips_junk_and_duplicates() {
        let words = words_from_slice(&["cat", "  dog ", "", "d0g", "CAT", "it's"]);
        assert_eq!(words, vec!["CAT", "DOG"]);
    }

    #[test]
    fn load_file() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "apple").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "Pear").unwrap();
        writeln!(f, "   ").unwrap();
        writeln!(f, "plum").unwrap();
        f.flush().unwrap();

        let words = load_from_file(f.path()).unwrap();
        assert_eq!(words, vec!["APPLE", "PEAR", "PLUM"]);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = load_from_file("/path/that/does/not/exist.txt").unwrap_err();
        assert!(err.to_string().contains("exist.txt"));
    }
}
