//! Pluggable move proposers.
//!
//! The engine never depends on any proposer other than its own minimax
//! search; callers may plug in alternatives (such as a corpus lookup) and
//! decide their own fallback policy when one fails.

use anyhow::{anyhow, Result};

use crate::board::{Board, Piece};
use crate::heuristic::ScoringWeights;
use crate::minimax::Minimax;

/// A source of recommended columns
pub trait MoveSource {
    /// Proposes a column for `piece` to play on `board`, or `None` when the
    /// board offers no move
    fn propose(&mut self, board: &Board, piece: Piece) -> Result<Option<usize>>;

    /// Return the source's display name.
    fn name(&self) -> &str;
}

/// Proposes the minimax engine's best move at a fixed depth
pub struct MinimaxMoveSource {
    depth: usize,
    weights: ScoringWeights,
}

impl MinimaxMoveSource {
    pub fn new(depth: usize, weights: ScoringWeights) -> Self {
        Self { depth, weights }
    }
}

impl MoveSource for MinimaxMoveSource {
    fn propose(&mut self, board: &Board, piece: Piece) -> Result<Option<usize>> {
        let result = Minimax::with_weights(piece, self.weights).best_move(board, self.depth);
        Ok(result.column)
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}

/// Asks `primary` for a move and falls back to `fallback` when it errors or
/// proposes an unplayable column
pub fn propose_with_fallback(
    primary: &mut dyn MoveSource,
    fallback: &mut dyn MoveSource,
    board: &Board,
    piece: Piece,
) -> Result<Option<usize>> {
    match primary.propose(board, piece) {
        Ok(Some(column)) if board.playable(column) => return Ok(Some(column)),
        Ok(Some(column)) => {
            log::warn!(
                "{} proposed unplayable column {}, using {}",
                primary.name(),
                column,
                fallback.name()
            );
        }
        Ok(None) => {}
        Err(err) => {
            log::warn!("{} failed: {}, using {}", primary.name(), err, fallback.name());
        }
    }

    match fallback.propose(board, piece)? {
        Some(column) if !board.playable(column) => Err(anyhow!(
            "{} proposed unplayable column {}",
            fallback.name(),
            column
        )),
        proposal => Ok(proposal),
    }
}
