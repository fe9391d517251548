/// Letter grid: an n×n matrix of uppercase letters.
///
/// Grids are immutable once built. They travel to and from the store as
/// one string per row (`to_rows` / `from_rows`), never as nested arrays.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;

pub const MIN_SIZE: usize = 4;
pub const MAX_SIZE: usize = 7;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<char>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    Empty,
    Ragged { row: usize, expected: usize, got: usize },
    NonLetter(char),
    NotSquare { rows: usize, cols: usize },
    BadSize(usize),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "grid has no rows"),
            Self::Ragged { row, expected, got } => {
                write!(f, "grid row {row} has {got} cells, expected {expected}")
            }
            Self::NonLetter(c) => write!(f, "grid cell {c:?} is not a letter"),
            Self::NotSquare { rows, cols } => {
                write!(f, "grid has {rows} rows of {cols} cells, expected a square")
            }
            Self::BadSize(n) => write!(f, "grid size {n} is outside {MIN_SIZE}..={MAX_SIZE}"),
        }
    }
}

impl std::error::Error for GridError {}

/// Clamp a requested size into the playable range.
pub fn clamp_size(n: usize) -> usize {
    n.clamp(MIN_SIZE, MAX_SIZE)
}

impl Grid {
    /// Fill an n×n grid with letters drawn uniformly from A..=Z.
    pub fn generate(n: usize, rng: &mut impl Rng) -> Self {
        let cells = (0..n)
            .map(|_| (0..n).map(|_| (b'A' + rng.random_range(0..26u8)) as char).collect())
            .collect();
        Grid { cells }
    }

    /// Rebuild a grid from its wire form (one string per row). The result
    /// is square and its side is within `MIN_SIZE..=MAX_SIZE`.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let first = rows.first().ok_or(GridError::Empty)?.as_ref().chars().count();
        if first == 0 {
            return Err(GridError::Empty);
        }
        let mut cells = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let chars: Vec<char> = row.as_ref().chars().map(|c| c.to_ascii_uppercase()).collect();
            if chars.len() != first {
                return Err(GridError::Ragged { row: i, expected: first, got: chars.len() });
            }
            if let Some(&bad) = chars.iter().find(|c| !c.is_ascii_uppercase()) {
                return Err(GridError::NonLetter(bad));
            }
            cells.push(chars);
        }
        if cells.len() != first {
            return Err(GridError::NotSquare { rows: cells.len(), cols: first });
        }
        if !(MIN_SIZE..=MAX_SIZE).contains(&first) {
            return Err(GridError::BadSize(first));
        }
        Ok(Grid { cells })
    }

    /// Flatten to the wire form.
    pub fn to_rows(&self) -> Vec<String> {
        self.cells.iter().map(|row| row.iter().collect()).collect()
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.cells
    }

    /// Every distinct letter appearing anywhere in the grid.
    pub fn letters(&self) -> HashSet<char> {
        self.cells.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generate_all_sizes() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in MIN_SIZE..=MAX_SIZE {
            let g = Grid::generate(n, &mut rng);
            assert_eq!(g.size(), n);
            for row in g.rows() {
                assert_eq!(row.len(), n);
                assert!(row.iter().all(|c| c.is_ascii_uppercase()));
            }
        }
    }

    #[test]
    fn clamp_keeps_range() {
        assert_eq!(clamp_size(2), 4);
        assert_eq!(clamp_size(5), 5);
        assert_eq!(clamp_size(12), 7);
    }

    #[test]
    fn wire_rows_roundtrip() {
        let g = Grid::from_rows(&["CATS", "DOGS", "BATS", "CUPS"]).unwrap();
        assert_eq!(g.size(), 4);
        assert_eq!(g.rows()[1][2], 'G');
        assert_eq!(g.to_rows(), vec!["CATS", "DOGS", "BATS", "CUPS"]);
    }

    #[test]
    fn from_rows_uppercases() {
        let g = Grid::from_rows(&["abcd", "efgh", "ijkl", "mnop"]).unwrap();
        assert_eq!(g.to_rows(), vec!["ABCD", "EFGH", "IJKL", "MNOP"]);
    }

    #[test]
    fn from_rows_rejects_bad_input() {
        let empty: [&str; 0] = [];
        assert_eq!(Grid::from_rows(&empty), Err(GridError::Empty));
        assert_eq!(
            Grid::from_rows(&["ABC", "AB"]),
            Err(GridError::Ragged { row: 1, expected: 3, got: 2 })
        );
        assert_eq!(
            Grid::from_rows(&["A1CD", "EFGH", "IJKL", "MNOP"]),
            Err(GridError::NonLetter('1'))
        );
    }

    #[test]
    fn from_rows_rejects_non_square_and_out_of_range() {
        assert_eq!(
            Grid::from_rows(&["ABCDEFG", "HIJKLMN"]),
            Err(GridError::NotSquare { rows: 2, cols: 7 })
        );
        assert_eq!(
            Grid::from_rows(&["ABCD", "EFGH", "IJKL"]),
            Err(GridError::NotSquare { rows: 3, cols: 4 })
        );
        assert_eq!(Grid::from_rows(&["ABC", "DEF", "GHI"]), Err(GridError::BadSize(3)));
        let big = vec!["ABCDEFGH"; 8];
        assert_eq!(Grid::from_rows(&big), Err(GridError::BadSize(8)));
        let seven = vec!["ABCDEFG"; 7];
        assert_eq!(Grid::from_rows(&seven).map(|g| g.size()), Ok(7));
    }

    #[test]
    fn letters_deduplicates() {
        let g = Grid::from_rows(&["AABA", "BCCA", "AAAA", "CBAA"]).unwrap();
        let l = g.letters();
        assert_eq!(l.len(), 3);
        assert!(l.contains(&'A') && l.contains(&'B') && l.contains(&'C'));
    }
}
