//! Static evaluation of non-terminal positions

use serde::{Deserialize, Serialize};

use crate::board::{window_cells, windows, Board, Cell, Piece};
use crate::{HEIGHT, WIDTH};

/// The tunable constants of the heuristic evaluator and of the outcome
/// classification margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// A window filled with own pieces
    pub four: i32,
    /// Three own pieces and one empty cell
    pub three: i32,
    /// Two own pieces and two empty cells
    pub two: i32,
    /// Three opponent pieces and one empty cell
    pub opponent_three: i32,
    /// Two opponent pieces and two empty cells
    pub opponent_two: i32,
    /// Per own piece in the centre column
    pub center: i32,
    /// Per column where the scored side wins immediately
    pub immediate_win: i32,
    /// Per column where the opponent would win immediately
    pub immediate_threat: i32,
    /// Heuristic lead needed before a side is reported as likely winning
    pub likely_win_margin: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            four: 100,
            three: 5,
            two: 2,
            opponent_three: -10,
            opponent_two: -2,
            center: 3,
            immediate_win: 50,
            immediate_threat: -50,
            likely_win_margin: 20,
        }
    }
}

impl ScoringWeights {
    fn score_window(&self, own: usize, opponent: usize, empty: usize) -> i32 {
        let mut score = 0;
        match (own, empty) {
            (4, _) => score += self.four,
            (3, 1) => score += self.three,
            (2, 2) => score += self.two,
            _ => {}
        }
        match (opponent, empty) {
            (3, 1) => score += self.opponent_three,
            (2, 2) => score += self.opponent_two,
            _ => {}
        }
        score
    }

    /// Scores `board` for `piece`, higher is better for `piece`.
    ///
    /// Scores are side-specific rather than zero-sum: an opponent threat
    /// costs more than an equal threat of our own earns.
    pub fn score(&self, board: &Board, piece: Piece) -> i32 {
        let own_cell = piece.cell();
        let opponent = piece.opponent();
        let mut score = 0;

        // one-move tactics dominate the positional terms
        for column in board.legal_columns() {
            if board.wins_with(column, piece) {
                score += self.immediate_win;
            }
            if board.wins_with(column, opponent) {
                score += self.immediate_threat;
            }
        }

        let center_column = WIDTH / 2;
        let center_count = (0..HEIGHT)
            .filter(|&row| board.get(row, center_column) == own_cell)
            .count() as i32;
        score += center_count * self.center;

        for (row, column, direction) in windows() {
            let (mut own, mut opp, mut empty) = (0, 0, 0);
            for (r, c) in window_cells(row, column, direction) {
                match board.get(r, c) {
                    Cell::Empty => empty += 1,
                    cell if cell == own_cell => own += 1,
                    _ => opp += 1,
                }
            }
            score += self.score_window(own, opp, empty);
        }

        score
    }
}

/// Scores `board` for `piece` with the default weights
pub fn score_position(board: &Board, piece: Piece) -> i32 {
    ScoringWeights::default().score(board, piece)
}
