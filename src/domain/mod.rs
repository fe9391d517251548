pub mod grid;
pub mod guess;
pub mod leaderboard;
pub mod solver;
pub mod wordlist;
