#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use crate::heuristic::ScoringWeights;
    use crate::minimax::{BLOCK_SCORE, WIN_SCORE};
    use crate::move_source::{propose_with_fallback, MinimaxMoveSource, MoveSource};
    use crate::*;

    // a full board without any line, rows written top-down
    const DRAWN_ROWS: [&str; HEIGHT] = [
        "XOXOXOX", "XOXOXOX", "OXOXOXO", "OXOXOXO", "XOXOXOX", "XOXOXOX",
    ];

    fn row_cells(row: usize, columns: std::ops::RangeInclusive<usize>) -> BTreeSet<(usize, usize)> {
        columns.map(|column| (row, column)).collect()
    }

    #[test]
    pub fn lines_in_every_direction() -> Result<()> {
        let horizontal = Board::from_rows(&[
            ".......", ".......", ".......", ".......", "OOO....", "XXXX...",
        ])?;
        let vertical = Board::from_rows(&[
            ".......", ".......", "X......", "X......", "XOO....", "XOO....",
        ])?;
        let diagonal = Board::from_rows(&[
            ".......", ".......", "...X...", "..XO...", ".XOO...", "XOOO...",
        ])?;
        let anti_diagonal = Board::from_rows(&[
            ".......", ".......", "X......", "OX.....", "OOX....", "OOOX...",
        ])?;

        for board in [horizontal, vertical, diagonal, anti_diagonal].iter() {
            assert!(board.has_line(Piece::PlayerOne), "{}", board);
            assert!(!board.has_line(Piece::PlayerTwo), "{}", board);
            assert_eq!(board.winner(), Some(Piece::PlayerOne));
            assert!(board.is_terminal());
        }

        assert_eq!(
            anti_diagonal.winning_cells(Piece::PlayerOne),
            [(3, 0), (2, 1), (1, 2), (0, 3)].iter().cloned().collect()
        );
        assert!(!Board::new().has_line(Piece::PlayerOne));
        Ok(())
    }

    #[test]
    pub fn winning_cells_cover_every_line() -> Result<()> {
        let board = Board::from_rows(&[
            ".......", ".......", ".......", ".......", "OOOO...", "XXXXX..",
        ])?;

        assert_eq!(board.winning_cells(Piece::PlayerOne), row_cells(0, 0..=4));
        assert_eq!(board.winning_cells(Piece::PlayerTwo), row_cells(1, 0..=3));
        assert!(Board::new().winning_cells(Piece::PlayerTwo).is_empty());
        Ok(())
    }

    #[test]
    pub fn drops_and_legal_columns() -> Result<()> {
        let mut board = Board::new();
        assert_eq!(board.legal_columns(), (0..WIDTH).collect::<Vec<_>>());

        for row in 0..HEIGHT {
            assert_eq!(board.drop(0, Piece::PlayerOne)?, row);
        }
        assert_eq!(
            board.drop(0, Piece::PlayerTwo),
            Err(MoveError::ColumnFull { column: 0 })
        );
        assert_eq!(
            board.drop(WIDTH, Piece::PlayerTwo),
            Err(MoveError::InvalidColumn { column: WIDTH })
        );
        assert_eq!(board.legal_columns(), (1..WIDTH).collect::<Vec<_>>());
        assert_eq!(board.empty_cells(), WIDTH * HEIGHT - HEIGHT);

        // copies leave the original untouched
        let (next, row) = board.with_move(3, Piece::PlayerTwo)?;
        assert_eq!(row, 0);
        assert_eq!(next.get(0, 3), Cell::PlayerTwo);
        assert_eq!(board.get(0, 3), Cell::Empty);

        let full = Board::from_rows(&DRAWN_ROWS)?;
        assert!(full.is_full());
        assert!(full.legal_columns().is_empty());
        assert_eq!(full.winner(), None);
        assert!(full.is_terminal());
        Ok(())
    }

    #[test]
    pub fn parse_positions() -> Result<()> {
        let board = Board::from_moves("4453")?;
        assert_eq!(board.get(0, 3), Cell::PlayerOne);
        assert_eq!(board.get(1, 3), Cell::PlayerTwo);
        assert_eq!(board.get(0, 4), Cell::PlayerOne);
        assert_eq!(board.get(0, 2), Cell::PlayerTwo);
        assert_eq!(board.side_to_move(), Piece::PlayerOne);
        assert_eq!(board.count(Piece::PlayerTwo), 2);

        assert!(Board::from_moves("8").is_err());
        assert!(Board::from_moves("1111111").is_err());
        assert!(Board::from_moves("1212121").is_ok());
        assert!(Board::from_moves("12121212").is_err());

        assert!(Board::from_rows(&["......."; HEIGHT - 1]).is_err());
        assert!(Board::from_rows(&[
            ".......", ".......", ".......", ".......", "X......", ".......",
        ])
        .is_err());

        let rows = [
            ".......", ".......", ".......", "...O...", "..XX...", ".OXOX..",
        ];
        let board = Board::from_rows(&rows)?;
        assert_eq!(board.to_string(), rows.join("\n") + "\n");
        assert_eq!(board.side_to_move(), Piece::PlayerTwo);
        Ok(())
    }

    #[test]
    pub fn immediate_wins() -> Result<()> {
        let board = Board::from_moves("112233")?;
        assert!(board.wins_with(3, Piece::PlayerOne));
        assert!(!board.wins_with(4, Piece::PlayerOne));
        assert!(!board.wins_with(3, Piece::PlayerTwo));
        assert_eq!(board.find_winning_move(Piece::PlayerOne), Some((3, 0)));
        assert_eq!(board.find_winning_move(Piece::PlayerTwo), None);
        assert!(!board.wins_with(WIDTH, Piece::PlayerOne));
        Ok(())
    }

    #[test]
    pub fn heuristic_scores() -> Result<()> {
        let empty = Board::new();
        assert_eq!(score_position(&empty, Piece::PlayerOne), 0);
        assert_eq!(score_position(&empty, Piece::PlayerTwo), 0);

        let centre = Board::from_moves("4")?;
        assert_eq!(score_position(&centre, Piece::PlayerOne), 3);
        assert_eq!(score_position(&centre, Piece::PlayerTwo), 0);

        let pair = Board::from_rows(&[
            ".......", ".......", ".......", ".......", ".......", "..XX...",
        ])?;
        assert_eq!(score_position(&pair, Piece::PlayerOne), 9);
        assert_eq!(score_position(&pair, Piece::PlayerTwo), -6);

        // an open three on both ends for PlayerOne
        let threat = Board::from_moves("27374")?;
        assert!(score_position(&threat, Piece::PlayerOne) > score_position(&threat, Piece::PlayerTwo));

        let weights = ScoringWeights {
            center: 10,
            ..ScoringWeights::default()
        };
        assert_eq!(weights.score(&centre, Piece::PlayerOne), 10);
        Ok(())
    }

    #[test]
    pub fn minimax_takes_wins_and_blocks() -> Result<()> {
        let board = Board::from_moves("112233")?;
        let result = best_move(&board, 4, Piece::PlayerOne);
        assert_eq!(result.column, Some(3));
        assert_eq!(result.score, WIN_SCORE);

        let board = Board::from_moves("17273")?;
        let result = best_move(&board, 4, Piece::PlayerTwo);
        assert_eq!(result.column, Some(3));
        assert_eq!(result.score, BLOCK_SCORE);

        let full = Board::from_rows(&DRAWN_ROWS)?;
        let result = best_move(&full, 4, Piece::PlayerOne);
        assert_eq!(result.column, None);
        assert_eq!(result.score, 0);
        Ok(())
    }

    #[test]
    pub fn minimax_prefers_lowest_column() -> Result<()> {
        let weights = ScoringWeights {
            center: 0,
            ..ScoringWeights::default()
        };
        let mut minimax = Minimax::with_weights(Piece::PlayerOne, weights);
        let result = minimax.best_move(&Board::new(), 1);

        assert_eq!(result.column, Some(0));
        assert_eq!(result.score, 0);
        assert!(minimax.node_count > 0);

        // depth 0 only scores the position
        let result = best_move(&Board::from_moves("4")?, 0, Piece::PlayerOne);
        assert_eq!(result.column, None);
        assert_eq!(result.score, 3);
        Ok(())
    }

    // unpruned minimax with the same terminal scores and tie-break
    fn plain_minimax(
        board: &Board,
        piece: Piece,
        depth: usize,
        maximizing: bool,
    ) -> (Option<usize>, i64) {
        if board.has_line(piece) {
            return (None, WIN_SCORE);
        }
        if board.has_line(piece.opponent()) {
            return (None, -WIN_SCORE);
        }
        if board.is_full() {
            return (None, 0);
        }
        if depth == 0 {
            return (None, score_position(board, piece) as i64);
        }

        let to_move = if maximizing { piece } else { piece.opponent() };
        let mut best = (None, if maximizing { i64::MIN } else { i64::MAX });
        for column in board.legal_columns() {
            let child = board.with_move(column, to_move).map(|(child, _)| child);
            let (_, score) = plain_minimax(&child.expect("legal column"), piece, depth - 1, !maximizing);
            if (maximizing && score > best.1) || (!maximizing && score < best.1) {
                best = (Some(column), score);
            }
        }
        best
    }

    #[test]
    pub fn pruning_matches_plain_minimax() -> Result<()> {
        let positions = ["", "4", "4453", "27374", "1122", "3344556"];

        for moves in positions.iter() {
            let board = Board::from_moves(moves)?;
            for &piece in [Piece::PlayerOne, Piece::PlayerTwo].iter() {
                for depth in 1..=4 {
                    let mut minimax = Minimax::new(piece);
                    let pruned = minimax.search(&board, depth, i64::MIN, i64::MAX, true);
                    let plain = plain_minimax(&board, piece, depth, true);
                    assert_eq!(pruned, plain, "position '{}', depth {}", moves, depth);
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn solver_finds_mate_in_two() -> Result<()> {
        let board = Board::from_moves("2737")?;
        let mut solver = Solver::new();
        let verdict = solver.solve(&board, Piece::PlayerOne, 4, &SearchControl::unbounded());

        assert_eq!(
            verdict,
            MateVerdict::Win {
                winner: Piece::PlayerOne,
                plies: 3,
                line: vec![
                    PlayedMove { column: 3, row: 0, piece: Piece::PlayerOne },
                    PlayedMove { column: 0, row: 0, piece: Piece::PlayerTwo },
                    PlayedMove { column: 4, row: 0, piece: Piece::PlayerOne },
                ],
            }
        );
        assert_eq!(verdict.moves(), Some(2));
        assert!(solver.node_count > 0);
        Ok(())
    }

    #[test]
    pub fn solver_credits_the_side_not_to_move() -> Result<()> {
        // PlayerTwo to move cannot cover both ends of the open three
        let board = Board::from_moves("27374")?;
        let verdict = Solver::new().solve(&board, Piece::PlayerTwo, 4, &SearchControl::unbounded());

        match verdict {
            MateVerdict::Win { winner, plies, .. } => {
                assert_eq!(winner, Piece::PlayerOne);
                assert_eq!(plies, 2);
            }
            other => return Err(anyhow!("expected a forced win, found {:?}", other)),
        }
        assert_eq!(verdict.moves(), Some(1));
        Ok(())
    }

    #[test]
    pub fn solver_proves_draws_and_stops() -> Result<()> {
        let board = Board::from_rows(&[
            ".OXOXO.", "XOXOXOX", "OXOXOXO", "OXOXOXO", "XOXOXOX", "XOXOXOX",
        ])?;
        let verdict = Solver::new().solve(&board, Piece::PlayerOne, 4, &SearchControl::unbounded());
        assert_eq!(verdict, MateVerdict::Draw);
        assert_eq!(verdict.moves(), None);

        // budgets below the first depth never search
        let verdict = Solver::new().solve(&board, Piece::PlayerOne, 2, &SearchControl::unbounded());
        assert_eq!(verdict, MateVerdict::Undetermined);

        let cancel = Arc::new(AtomicBool::new(true));
        let control = SearchControl::unbounded().with_cancel_flag(cancel);
        let verdict = Solver::new().solve(&Board::new(), Piece::PlayerOne, 12, &control);
        assert_eq!(verdict, MateVerdict::Undetermined);
        Ok(())
    }

    #[test]
    pub fn solver_stops_at_deadline() -> Result<()> {
        let board = Board::from_moves("2737")?;
        let expired = SearchControl::unbounded().with_time_limit(Duration::from_secs(0));
        assert!(expired.should_stop());

        let verdict = Solver::new().solve(&board, Piece::PlayerOne, 4, &expired);
        assert_eq!(verdict, MateVerdict::Undetermined);

        let past = SearchControl::unbounded().with_deadline(Instant::now());
        let verdict = Solver::new().solve(&board, Piece::PlayerOne, 4, &past);
        assert_eq!(verdict, MateVerdict::Undetermined);

        // the same position is proven without a deadline
        let later = SearchControl::unbounded().with_time_limit(Duration::from_secs(3600));
        let verdict = Solver::new().solve(&board, Piece::PlayerOne, 4, &later);
        assert_eq!(verdict.moves(), Some(2));
        Ok(())
    }

    #[test]
    pub fn outcome_of_finished_games() -> Result<()> {
        let board = Board::from_moves("1212121")?;
        let outcome = evaluate_outcome(&board, 6);
        assert_eq!(outcome.kind, OutcomeKind::PlayerOneWin);
        assert_eq!(outcome.moves, Some(0));
        assert_eq!(outcome.winning_cells, [(0, 0), (1, 0), (2, 0), (3, 0)].iter().cloned().collect());

        let outcome = evaluate_outcome(&Board::from_rows(&DRAWN_ROWS)?, 6);
        assert_eq!(outcome.kind, OutcomeKind::Draw);
        assert_eq!(outcome.moves, Some(0));
        assert!(outcome.winning_cells.is_empty());
        Ok(())
    }

    #[test]
    pub fn outcome_of_immediate_wins() -> Result<()> {
        let board = Board::from_rows(&[
            ".......", ".......", ".......", ".......", "..OO...", ".XXX...",
        ])?;
        let outcome = evaluate_outcome(&board, 6);
        assert_eq!(outcome.kind, OutcomeKind::PlayerOneWin);
        assert_eq!(outcome.moves, Some(1));
        assert_eq!(outcome.column, Some(4));
        assert_eq!(outcome.winning_cells, row_cells(0, 1..=4));
        assert_eq!(outcome.to_string(), "Player 1 wins in 1 move (column 5)");

        let board = Board::from_rows(&[
            ".......", ".......", ".......", "..O....", "X.O....", "X.O.X..",
        ])?;
        let analyzer = Analyzer::default();
        let outcome = analyzer.evaluate(&board, Some(Piece::PlayerTwo), 6, &SearchControl::unbounded());
        assert_eq!(outcome.kind, OutcomeKind::PlayerTwoWin);
        assert_eq!(outcome.moves, Some(1));
        assert_eq!(outcome.column, Some(2));
        assert_eq!(
            outcome.winning_cells,
            [(0, 2), (1, 2), (2, 2), (3, 2)].iter().cloned().collect()
        );
        Ok(())
    }

    #[test]
    pub fn outcome_framing_of_side_to_move() -> Result<()> {
        let board = Board::from_moves("27374")?;

        // either side: the opponent's immediate win is credited
        let outcome = evaluate_outcome(&board, 4);
        assert_eq!(outcome.kind, OutcomeKind::PlayerOneWin);
        assert_eq!(outcome.moves, Some(1));
        assert_eq!(outcome.column, Some(4));

        // with PlayerTwo to move the win is proven through the solver
        let outcome = Analyzer::default().evaluate(
            &board,
            Some(Piece::PlayerTwo),
            4,
            &SearchControl::unbounded(),
        );
        assert_eq!(outcome.kind, OutcomeKind::PlayerOneWin);
        assert_eq!(outcome.moves, Some(1));
        assert_eq!(outcome.line.len(), 2);
        Ok(())
    }

    #[test]
    pub fn outcome_of_forced_wins() -> Result<()> {
        let board = Board::from_moves("2737")?;
        let outcome = evaluate_outcome(&board, 4);

        assert_eq!(outcome.kind, OutcomeKind::PlayerOneWin);
        assert_eq!(outcome.moves, Some(2));
        assert_eq!(outcome.column, Some(3));
        assert_eq!(outcome.winning_cells, row_cells(0, 1..=4));
        assert_eq!(outcome.line.len(), 3);
        assert!(outcome.kind.is_decided());
        Ok(())
    }

    #[test]
    pub fn outcome_of_open_positions() -> Result<()> {
        let board = Board::from_rows(&[
            ".OXOXO.", "XOXOXOX", "OXOXOXO", "OXOXOXO", "XOXOXOX", "XOXOXOX",
        ])?;
        let outcome = evaluate_outcome(&board, 4);
        assert_eq!(outcome.kind, OutcomeKind::Draw);
        assert_eq!(outcome.moves, None);

        let outcome = evaluate_outcome(&Board::new(), 6);
        assert_eq!(outcome.kind, OutcomeKind::Undetermined);
        assert_eq!(outcome.moves, None);
        assert_eq!(outcome.column, None);
        assert_eq!(outcome.to_string(), "Undetermined");

        let centre = Board::from_moves("4")?;
        assert_eq!(evaluate_outcome(&centre, 1).kind, OutcomeKind::Undetermined);

        let mut config = AnalysisConfig::default();
        config.weights.likely_win_margin = 0;
        let outcome = Analyzer::new(config).evaluate(&centre, None, 1, &SearchControl::unbounded());
        assert_eq!(outcome.kind, OutcomeKind::PlayerOneLikelyWin);
        assert_eq!(outcome.kind.favoured(), Some(Piece::PlayerOne));
        assert!(!outcome.kind.is_decided());
        Ok(())
    }

    #[test]
    pub fn ranking_puts_wins_first() -> Result<()> {
        let board = Board::from_moves("112233")?;
        let rankings = Analyzer::default().rank_moves(&board, Piece::PlayerOne);

        assert_eq!(rankings.len(), WIDTH);
        assert_eq!(rankings[0].column, 3);
        assert!(rankings[0].wins);
        assert_eq!(rankings[0].score, WIN_SCORE);
        assert!(rankings.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert_eq!(rankings.iter().filter(|ranking| ranking.wins).count(), 1);
        Ok(())
    }

    #[test]
    pub fn ranking_keeps_wins_ahead_of_double_threats() -> Result<()> {
        // quiet moves that keep both ends of the open three also search as wins
        let board = Board::from_rows(&[
            ".......", ".......", ".......", ".......", "..OO...", "..XXX..",
        ])?;
        let rankings = Analyzer::default().rank_moves(&board, Piece::PlayerOne);

        let winning: Vec<usize> = rankings
            .iter()
            .take_while(|ranking| ranking.wins)
            .map(|ranking| ranking.column)
            .collect();
        assert_eq!(winning, vec![1, 5]);
        assert!(rankings[2..].iter().all(|ranking| !ranking.wins));
        assert!(rankings[2..]
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
        Ok(())
    }

    #[test]
    pub fn batch_analysis_matches_single_positions() -> Result<()> {
        let mut config = AnalysisConfig::default();
        config.search.mate_depth = 6;
        let analyzer = Analyzer::new(config);

        let boards = ["112233", "2737", "27374", "4", ""]
            .iter()
            .map(Board::from_moves)
            .collect::<Result<Vec<_>>>()?;
        let done = AtomicUsize::new(0);
        let outcomes = analyzer.analyze_positions(&boards, || {
            done.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(done.load(Ordering::SeqCst), boards.len());
        for (board, outcome) in boards.iter().zip(outcomes.iter()) {
            let single = analyzer.evaluate(board, None, 6, &SearchControl::unbounded());
            assert_eq!(&single, outcome);
        }
        Ok(())
    }

    struct BrokenSource {
        proposal: Option<usize>,
    }

    impl MoveSource for BrokenSource {
        fn propose(&mut self, _board: &Board, _piece: Piece) -> Result<Option<usize>> {
            match self.proposal {
                Some(column) => Ok(Some(column)),
                None => Err(anyhow!("no data for this position")),
            }
        }

        fn name(&self) -> &str {
            "Broken"
        }
    }

    #[test]
    pub fn move_sources_fall_back() -> Result<()> {
        let board = Board::from_moves("112233")?;
        let mut fallback = MinimaxMoveSource::new(1, ScoringWeights::default());

        let mut failing = BrokenSource { proposal: None };
        let column = propose_with_fallback(&mut failing, &mut fallback, &board, Piece::PlayerOne)?;
        assert_eq!(column, Some(3));

        let mut unplayable = BrokenSource { proposal: Some(WIDTH + 2) };
        let column = propose_with_fallback(&mut unplayable, &mut fallback, &board, Piece::PlayerOne)?;
        assert_eq!(column, Some(3));

        let mut valid = BrokenSource { proposal: Some(6) };
        let column = propose_with_fallback(&mut valid, &mut fallback, &board, Piece::PlayerOne)?;
        assert_eq!(column, Some(6));

        let mut both_broken = BrokenSource { proposal: None };
        let mut also_broken = BrokenSource { proposal: None };
        assert!(propose_with_fallback(&mut both_broken, &mut also_broken, &board, Piece::PlayerOne).is_err());
        Ok(())
    }
}
