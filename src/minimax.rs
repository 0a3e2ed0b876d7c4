//! Depth-bounded minimax search with alpha-beta pruning

use log::debug;

use crate::board::{Board, Piece};
use crate::heuristic::ScoringWeights;

/// The score of a position won by the maximizing side
pub const WIN_SCORE: i64 = 10_000_000_000_000;

/// The score given at the root to a move that blocks an immediate opponent win
pub const BLOCK_SCORE: i64 = WIN_SCORE - 1;

/// A recommended move and its score for the maximizing side.
/// `column` is `None` at leaves and when no move can be played.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchResult {
    pub column: Option<usize>,
    pub score: i64,
}

/// A minimax searcher scoring positions for one fixed side
///
/// # Notes
/// Columns are always searched in ascending order and a column only replaces
/// the current best on a strictly better score, so among equal moves the
/// lowest column is chosen and the search is fully deterministic.
#[derive(Clone)]
pub struct Minimax {
    piece: Piece,
    weights: ScoringWeights,

    /// The number of nodes searched by this `Minimax` so far (for diagnostics only)
    pub node_count: usize,
}

impl Minimax {
    /// Creates a new `Minimax` maximizing for `piece` with the default weights
    pub fn new(piece: Piece) -> Self {
        Self::with_weights(piece, ScoringWeights::default())
    }

    pub fn with_weights(piece: Piece, weights: ScoringWeights) -> Self {
        Self {
            piece,
            weights,
            node_count: 0,
        }
    }

    fn terminal_score(&self, board: &Board) -> Option<i64> {
        if board.has_line(self.piece) {
            Some(WIN_SCORE)
        } else if board.has_line(self.piece.opponent()) {
            Some(-WIN_SCORE)
        } else if board.is_full() {
            Some(0)
        } else {
            None
        }
    }

    /// Finds the best move for the maximizing side, which is to move.
    ///
    /// Immediate wins and forced blocks are answered without searching.
    pub fn best_move(&mut self, board: &Board, depth: usize) -> SearchResult {
        let legal = board.legal_columns();
        if legal.is_empty() {
            return SearchResult {
                column: None,
                score: 0,
            };
        }

        if board.winner().is_none() {
            if let Some(&column) = legal.iter().find(|&&c| board.wins_with(c, self.piece)) {
                debug!("column {} wins immediately", column);
                return SearchResult {
                    column: Some(column),
                    score: WIN_SCORE,
                };
            }
            let opponent = self.piece.opponent();
            if let Some(&column) = legal.iter().find(|&&c| board.wins_with(c, opponent)) {
                debug!("column {} blocks an immediate loss", column);
                return SearchResult {
                    column: Some(column),
                    score: BLOCK_SCORE,
                };
            }
        }

        let (column, score) = self.search(board, depth, i64::MIN, i64::MAX, true);
        debug!(
            "minimax depth {}: column {:?}, score {}, {} nodes",
            depth, column, score, self.node_count
        );
        SearchResult { column, score }
    }

    /// Performs alpha-beta search from `board`, with the maximizing side to
    /// move when `maximizing` is set
    ///
    /// Returns the chosen column and the score for the maximizing side.
    /// Terminal positions and the depth horizon return no column.
    pub fn search(
        &mut self,
        board: &Board,
        depth: usize,
        mut alpha: i64,
        mut beta: i64,
        maximizing: bool,
    ) -> (Option<usize>, i64) {
        self.node_count += 1;

        if let Some(score) = self.terminal_score(board) {
            return (None, score);
        }
        if depth == 0 {
            return (None, self.weights.score(board, self.piece) as i64);
        }

        let to_move = if maximizing {
            self.piece
        } else {
            self.piece.opponent()
        };
        let mut best_column = None;
        let mut value = if maximizing { i64::MIN } else { i64::MAX };

        for column in board.legal_columns() {
            let mut child = *board;
            if child.drop(column, to_move).is_err() {
                continue;
            }
            let (_, score) = self.search(&child, depth - 1, alpha, beta, !maximizing);

            if maximizing {
                if score > value {
                    value = score;
                    best_column = Some(column);
                }
                alpha = alpha.max(value);
            } else {
                if score < value {
                    value = score;
                    best_column = Some(column);
                }
                beta = beta.min(value);
            }
            // the opponent already has a better option elsewhere
            if alpha >= beta {
                break;
            }
        }

        (best_column, value)
    }
}

/// Finds the best move for `maximizing_piece` searching `depth` plies with
/// the default weights
pub fn best_move(board: &Board, depth: usize, maximizing_piece: Piece) -> SearchResult {
    Minimax::new(maximizing_piece).best_move(board, depth)
}
