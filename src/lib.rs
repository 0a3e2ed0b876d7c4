//! A position analyser for the board game 'Connect 4'
//!
//! This crate combines a windowed heuristic evaluator, a depth-bounded
//! alpha-beta minimax search and a forced-win ("mate in N") solver to
//! classify any legal position and recommend moves.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_engine::{board::Board, outcome::{evaluate_outcome, OutcomeKind}};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let board = Board::from_moves("112233")?;
//! let outcome = evaluate_outcome(&board, 6);
//!
//! assert_eq!(outcome.kind, OutcomeKind::PlayerOneWin);
//! assert_eq!((outcome.moves, outcome.column), (Some(1), Some(3)));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod board;

pub mod heuristic;

pub mod minimax;

pub mod solver;

pub mod outcome;

pub mod analysis;

pub mod move_source;

pub mod config;

mod test;

pub use board::{Board, Cell, Piece, PlayedMove};
pub use config::AnalysisConfig;
pub use error::{ConfigError, MoveError};
pub use heuristic::{score_position, ScoringWeights};
pub use minimax::{best_move, Minimax, SearchResult};
pub use outcome::{evaluate_outcome, Analyzer, Outcome, OutcomeKind};
pub use solver::{MateVerdict, SearchControl, Solver};

/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

/// The number of aligned tiles needed to win
pub const LINE_LENGTH: usize = 4;

// the window scans and the centre column bonus assume a board at least one line wide
const_assert!(WIDTH >= LINE_LENGTH && HEIGHT >= LINE_LENGTH);
const_assert!(WIDTH % 2 == 1);
