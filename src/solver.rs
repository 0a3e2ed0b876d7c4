//! An agent to prove forced wins ("mate in N") in Connect 4 positions

use log::debug;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::{Board, PlayedMove, Piece};

/// The smallest depth budget of the iterative deepening loop
pub const MIN_SEARCH_DEPTH: usize = 4;

/// Converts a mate distance in plies to the winner's full moves
pub fn plies_to_moves(plies: usize) -> usize {
    (plies + 1) / 2
}

/// External stop conditions, checked between depth increments of the solver
#[derive(Clone, Default, Debug)]
pub struct SearchControl {
    cancel: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

impl SearchControl {
    /// A control that never stops the search early
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Stops the search once `flag` is set, e.g. by a UI thread
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_time_limit(self, limit: Duration) -> Self {
        self.with_deadline(Instant::now() + limit)
    }

    pub fn should_stop(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// The verdict of a forced-win search
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum MateVerdict {
    /// `winner` forces a line within `plies` half-moves; `line` is one
    /// sequence realizing it under optimal opposition
    Win {
        winner: Piece,
        plies: usize,
        line: Vec<PlayedMove>,
    },
    /// The search reached the end of the game and neither side can force a
    /// line, so the game is drawn under best play
    Draw,
    /// No forced result within the depth budget
    Undetermined,
}

impl MateVerdict {
    /// The mate distance in the winner's full moves
    pub fn moves(&self) -> Option<usize> {
        match self {
            MateVerdict::Win { plies, .. } => Some(plies_to_moves(*plies)),
            _ => None,
        }
    }
}

/// A forced-win solver
///
/// # Notes
/// A move counts as mating only if every reply of the defender still leads
/// to a mate: a single escaping reply refutes the branch. The attacker takes
/// the shortest mate available and the defender the longest, so the reported
/// distance is the one reached under optimal opposition.
#[derive(Clone, Default)]
pub struct Solver {
    /// The number of nodes searched by this `Solver` so far (for diagnostics only)
    pub node_count: usize,
}

impl Solver {
    pub fn new() -> Self {
        Self { node_count: 0 }
    }

    /// Searches for a forced line of `attacker` within `depth` plies, with
    /// `to_move` about to play. `board` must not be won by either side.
    ///
    /// Returns the shortest forcing line, or `None` if the defender can
    /// escape or the board fills up.
    pub fn mate_search(
        &mut self,
        board: &Board,
        attacker: Piece,
        to_move: Piece,
        depth: usize,
    ) -> Option<Vec<PlayedMove>> {
        self.node_count += 1;
        if depth == 0 {
            return None;
        }
        let legal = board.legal_columns();
        if legal.is_empty() {
            return None;
        }

        if to_move == attacker {
            if let Some((column, row)) = board.find_winning_move(attacker) {
                return Some(vec![PlayedMove {
                    column,
                    row,
                    piece: attacker,
                }]);
            }

            let mut best: Option<Vec<PlayedMove>> = None;
            for column in legal {
                let (child, row) = match board.with_move(column, attacker) {
                    Ok(next) => next,
                    Err(_) => continue,
                };
                if let Some(line) = self.mate_search(&child, attacker, attacker.opponent(), depth - 1) {
                    if best.as_ref().map_or(true, |b| line.len() + 1 < b.len()) {
                        let mut full_line = Vec::with_capacity(line.len() + 1);
                        full_line.push(PlayedMove {
                            column,
                            row,
                            piece: attacker,
                        });
                        full_line.extend(line);
                        best = Some(full_line);
                    }
                    // without an immediate win nothing beats attack, reply, win
                    if best.as_ref().map_or(false, |b| b.len() <= 3) {
                        break;
                    }
                }
            }
            best
        } else {
            // a defender with a winning move of its own has escaped
            if board.find_winning_move(to_move).is_some() {
                return None;
            }

            let mut longest: Option<Vec<PlayedMove>> = None;
            for column in legal {
                let (child, row) = match board.with_move(column, to_move) {
                    Ok(next) => next,
                    Err(_) => continue,
                };
                let line = self.mate_search(&child, attacker, attacker, depth - 1)?;
                if longest.as_ref().map_or(true, |l| line.len() + 1 > l.len()) {
                    let mut full_line = Vec::with_capacity(line.len() + 1);
                    full_line.push(PlayedMove {
                        column,
                        row,
                        piece: to_move,
                    });
                    full_line.extend(line);
                    longest = Some(full_line);
                }
            }
            longest
        }
    }

    /// Determines whether either side can force a win from `board` with
    /// `to_move` about to play, deepening in pairs of plies up to `max_depth`
    pub fn solve(
        &mut self,
        board: &Board,
        to_move: Piece,
        max_depth: usize,
        control: &SearchControl,
    ) -> MateVerdict {
        if let Some(winner) = board.winner() {
            return MateVerdict::Win {
                winner,
                plies: 0,
                line: Vec::new(),
            };
        }
        if board.is_full() {
            return MateVerdict::Draw;
        }

        if let Some((column, row)) = board.find_winning_move(to_move) {
            return MateVerdict::Win {
                winner: to_move,
                plies: 1,
                line: vec![PlayedMove {
                    column,
                    row,
                    piece: to_move,
                }],
            };
        }

        let start = Instant::now();
        let mut depth = MIN_SEARCH_DEPTH;
        while depth <= max_depth {
            if control.should_stop() {
                debug!("mate search stopped before depth {}", depth);
                break;
            }

            for &attacker in [to_move, to_move.opponent()].iter() {
                if let Some(line) = self.mate_search(board, attacker, to_move, depth) {
                    debug!(
                        "{} forces a win in {} plies (depth {}, {} nodes, {:.3}s)",
                        attacker.name(),
                        line.len(),
                        depth,
                        self.node_count,
                        start.elapsed().as_secs_f64()
                    );
                    return MateVerdict::Win {
                        winner: attacker,
                        plies: line.len(),
                        line,
                    };
                }
            }
            debug!(
                "no forced win within {} plies ({} nodes, {:.3}s)",
                depth,
                self.node_count,
                start.elapsed().as_secs_f64()
            );

            // the search covered every continuation to the end of the game
            if depth >= board.empty_cells() {
                return MateVerdict::Draw;
            }
            depth += 2;
        }

        MateVerdict::Undetermined
    }
}
