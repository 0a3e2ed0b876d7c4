use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::collections::BTreeSet;
use std::io::{stdout, Write};

use connect4_engine::{Board, Cell, Outcome, OutcomeKind, Piece, ScoringWeights, HEIGHT, WIDTH};

const BAR_WIDTH: usize = 40;

/// Draws the board top-down, with `highlight` cells (row, column) marked
pub fn draw_board(board: &Board, highlight: &BTreeSet<(usize, usize)>) -> Result<()> {
    let mut stdout = stdout();

    let cols: String = (1..=WIDTH).map(|x| x.to_string()).collect();
    stdout.queue(PrintStyledContent(style(cols + "\n")))?;

    for row in (0..HEIGHT).rev() {
        for column in 0..WIDTH {
            let background = if highlight.contains(&(row, column)) {
                Color::DarkGreen
            } else {
                Color::DarkBlue
            };
            stdout.queue(PrintStyledContent(
                style("O")
                    .attribute(Attribute::Bold)
                    .on(background)
                    .with(match board.get(row, column) {
                        Cell::PlayerOne => Color::Red,
                        Cell::PlayerTwo => Color::Yellow,
                        Cell::Empty => background,
                    }),
            ))?;
        }
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.flush()?;
    Ok(())
}

/// Where the evaluation bar splits, from 0 (Player 2 winning) to `BAR_WIDTH`
fn bar_position(outcome: &Outcome, board: &Board, weights: &ScoringWeights) -> usize {
    match outcome.kind {
        OutcomeKind::PlayerOneWin => BAR_WIDTH,
        OutcomeKind::PlayerTwoWin => 0,
        OutcomeKind::Draw => BAR_WIDTH / 2,
        _ => {
            let difference = weights.score(board, Piece::PlayerOne) as i64
                - weights.score(board, Piece::PlayerTwo) as i64;
            (BAR_WIDTH as i64 / 2 + difference / 10).max(0).min(BAR_WIDTH as i64) as usize
        }
    }
}

/// Prints the outcome text and a proportional evaluation bar
pub fn draw_evaluation(outcome: &Outcome, board: &Board, weights: &ScoringWeights) -> Result<()> {
    let mut stdout = stdout();
    let position = bar_position(outcome, board, weights);

    stdout
        .queue(PrintStyledContent(style("[P1]")))?
        .queue(PrintStyledContent(
            style("█".repeat(position)).with(Color::Red),
        ))?
        .queue(PrintStyledContent(
            style("█".repeat(BAR_WIDTH - position)).with(Color::Yellow),
        ))?
        .queue(PrintStyledContent(style("[P2]\n")))?;
    stdout.flush()?;

    println!("Evaluation: {}", outcome);
    Ok(())
}
