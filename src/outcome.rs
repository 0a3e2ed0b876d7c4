//! Classification of positions into wins, draws and heuristic verdicts

use log::info;

use std::collections::BTreeSet;
use std::fmt;

use crate::board::{Board, PlayedMove, Piece};
use crate::config::AnalysisConfig;
use crate::solver::{plies_to_moves, MateVerdict, SearchControl, Solver};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OutcomeKind {
    PlayerOneWin,
    PlayerTwoWin,
    Draw,
    PlayerOneLikelyWin,
    PlayerTwoLikelyWin,
    Undetermined,
}

impl OutcomeKind {
    pub fn win_for(piece: Piece) -> Self {
        match piece {
            Piece::PlayerOne => OutcomeKind::PlayerOneWin,
            Piece::PlayerTwo => OutcomeKind::PlayerTwoWin,
        }
    }

    pub fn likely_win_for(piece: Piece) -> Self {
        match piece {
            Piece::PlayerOne => OutcomeKind::PlayerOneLikelyWin,
            Piece::PlayerTwo => OutcomeKind::PlayerTwoLikelyWin,
        }
    }

    /// The side favoured by this outcome, if any
    pub fn favoured(&self) -> Option<Piece> {
        match self {
            OutcomeKind::PlayerOneWin | OutcomeKind::PlayerOneLikelyWin => Some(Piece::PlayerOne),
            OutcomeKind::PlayerTwoWin | OutcomeKind::PlayerTwoLikelyWin => Some(Piece::PlayerTwo),
            OutcomeKind::Draw | OutcomeKind::Undetermined => None,
        }
    }

    pub fn is_decided(&self) -> bool {
        matches!(
            self,
            OutcomeKind::PlayerOneWin | OutcomeKind::PlayerTwoWin | OutcomeKind::Draw
        )
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::PlayerOneWin => write!(f, "Player 1 wins"),
            OutcomeKind::PlayerTwoWin => write!(f, "Player 2 wins"),
            OutcomeKind::Draw => write!(f, "Draw"),
            OutcomeKind::PlayerOneLikelyWin => write!(f, "Player 1 likely wins"),
            OutcomeKind::PlayerTwoLikelyWin => write!(f, "Player 2 likely wins"),
            OutcomeKind::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// The classified result of a position
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// Full moves of the winning side until the result, when known
    pub moves: Option<usize>,
    /// The first column of the deciding line
    pub column: Option<usize>,
    /// Cells (row, column) of the deciding line, for highlighting
    pub winning_cells: BTreeSet<(usize, usize)>,
    /// The reconstructed move sequence leading to the result
    pub line: Vec<PlayedMove>,
}

impl Outcome {
    fn new(kind: OutcomeKind, moves: Option<usize>) -> Self {
        Self {
            kind,
            moves,
            column: None,
            winning_cells: BTreeSet::new(),
            line: Vec::new(),
        }
    }

    /// A win realized by playing `line` on `board`
    fn forced_win(board: &Board, winner: Piece, plies: usize, line: Vec<PlayedMove>) -> Self {
        let mut end = *board;
        for played in line.iter() {
            // the line was built from legal drops on this very board
            if end.drop(played.column, played.piece).is_err() {
                break;
            }
        }
        Self {
            kind: OutcomeKind::win_for(winner),
            moves: Some(plies_to_moves(plies)),
            column: line.first().map(|played| played.column),
            winning_cells: end.winning_cells(winner),
            line,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let (Some(moves), true) = (self.moves, self.kind.favoured().is_some()) {
            let move_string = if moves == 1 { "move" } else { "moves" };
            write!(f, " in {} {}", moves, move_string)?;
        }
        if let Some(column) = self.column {
            write!(f, " (column {})", column + 1)?;
        }
        Ok(())
    }
}

/// Orchestrates terminal checks, one-move tactics, the forced-win solver and
/// the heuristic fallback
#[derive(Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Classifies `board`, searching forced wins up to `max_depth` plies.
    ///
    /// With `to_move` given, only that side's immediate wins are credited
    /// before the solver runs. Without it, either side's immediate win counts
    /// when the other side has none, and the inferred side to move breaks
    /// the tie when both do.
    pub fn evaluate(
        &self,
        board: &Board,
        to_move: Option<Piece>,
        max_depth: usize,
        control: &SearchControl,
    ) -> Outcome {
        let outcome = self.classify(board, to_move, max_depth, control);
        info!("position evaluated: {}", outcome);
        outcome
    }

    fn classify(
        &self,
        board: &Board,
        to_move: Option<Piece>,
        max_depth: usize,
        control: &SearchControl,
    ) -> Outcome {
        for &piece in [Piece::PlayerOne, Piece::PlayerTwo].iter() {
            if board.has_line(piece) {
                let mut outcome = Outcome::new(OutcomeKind::win_for(piece), Some(0));
                outcome.winning_cells = board.winning_cells(piece);
                return outcome;
            }
        }
        if board.is_full() {
            return Outcome::new(OutcomeKind::Draw, Some(0));
        }

        let mover = to_move.unwrap_or_else(|| board.side_to_move());
        let mover_win = board.find_winning_move(mover);
        let immediate = match (mover_win, to_move) {
            (Some((column, row)), _) => Some((mover, column, row)),
            (None, None) => board
                .find_winning_move(mover.opponent())
                .map(|(column, row)| (mover.opponent(), column, row)),
            (None, Some(_)) => None,
        };
        if let Some((winner, column, row)) = immediate {
            let line = vec![PlayedMove {
                column,
                row,
                piece: winner,
            }];
            return Outcome::forced_win(board, winner, 1, line);
        }

        let mut solver = Solver::new();
        match solver.solve(board, mover, max_depth, control) {
            MateVerdict::Win {
                winner,
                plies,
                line,
            } => return Outcome::forced_win(board, winner, plies, line),
            MateVerdict::Draw => return Outcome::new(OutcomeKind::Draw, None),
            MateVerdict::Undetermined => {}
        }

        let weights = &self.config.weights;
        let one = weights.score(board, Piece::PlayerOne);
        let two = weights.score(board, Piece::PlayerTwo);
        if one > two + weights.likely_win_margin {
            Outcome::new(OutcomeKind::likely_win_for(Piece::PlayerOne), None)
        } else if two > one + weights.likely_win_margin {
            Outcome::new(OutcomeKind::likely_win_for(Piece::PlayerTwo), None)
        } else {
            Outcome::new(OutcomeKind::Undetermined, None)
        }
    }
}

/// Classifies `board` with the default configuration, crediting whichever
/// side has an immediate win and searching forced wins up to `max_depth` plies
pub fn evaluate_outcome(board: &Board, max_depth: usize) -> Outcome {
    Analyzer::default().evaluate(board, None, max_depth, &SearchControl::unbounded())
}
