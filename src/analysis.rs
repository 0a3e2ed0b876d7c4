//! Parallel analysis helpers: candidate move ranking and batch classification

use rayon::prelude::*;

use crate::board::{Board, Piece};
use crate::minimax::{Minimax, WIN_SCORE};
use crate::outcome::{Analyzer, Outcome};
use crate::solver::SearchControl;

/// The evaluation of one candidate move for the side to move
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MoveRanking {
    pub column: usize,
    /// Minimax score for the mover after the opponent's best replies
    pub score: i64,
    /// The move completes a line
    pub wins: bool,
}

impl Analyzer {
    /// Scores every legal move of `piece`, immediate wins first and then by
    /// score. Candidates are searched in parallel; equal scores keep ascending
    /// column order.
    pub fn rank_moves(&self, board: &Board, piece: Piece) -> Vec<MoveRanking> {
        let depth = self.config().search.ranking_depth;
        let weights = self.config().weights;

        let mut rankings: Vec<MoveRanking> = board
            .legal_columns()
            .into_par_iter()
            .filter_map(|column| {
                let wins = board.wins_with(column, piece);
                let (child, _) = board.with_move(column, piece).ok()?;
                let score = if wins {
                    WIN_SCORE
                } else {
                    let mut minimax = Minimax::with_weights(piece, weights);
                    minimax.search(&child, depth, i64::MIN, i64::MAX, false).1
                };
                Some(MoveRanking {
                    column,
                    score,
                    wins,
                })
            })
            .collect();

        // a kept double threat can score like a win, so wins sort on their own
        rankings.sort_by(|a, b| b.wins.cmp(&a.wins).then(b.score.cmp(&a.score)));
        rankings
    }

    /// Classifies independent positions in parallel, returning outcomes in
    /// input order. `on_done` runs once per finished position.
    pub fn analyze_positions<F>(&self, boards: &[Board], on_done: F) -> Vec<Outcome>
    where
        F: Fn() + Sync + Send,
    {
        let max_depth = self.config().search.mate_depth;
        let time_limit = self.config().search.time_limit();

        boards
            .par_iter()
            .map(|board| {
                let control = match time_limit {
                    Some(limit) => SearchControl::unbounded().with_time_limit(limit),
                    None => SearchControl::unbounded(),
                };
                let outcome = self.evaluate(board, None, max_depth, &control);
                on_done();
                outcome
            })
            .collect()
    }
}
