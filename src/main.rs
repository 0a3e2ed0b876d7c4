use anyhow::{anyhow, Result};
use indicatif::*;
use log::info;

use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, Write};
use std::path::Path;
use std::time::Instant;

use connect4_engine::config::DEFAULT_CONFIG_PATH;
use connect4_engine::move_source::{propose_with_fallback, MinimaxMoveSource, MoveSource};
use connect4_engine::*;

mod display;
use display::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AnalysisConfig::load_or_default(Path::new(&config_path))?;
    let analyzer = Analyzer::new(config);

    println!("Welcome to Connect 4\n");

    loop {
        match prompt("Play a game (p), analyse positions from a file (a) or quit (q)? ")?
            .to_lowercase()
            .chars()
            .next()
        {
            Some('p') => play(&analyzer)?,
            Some('a') => {
                let path = prompt("Path to a file of move strings: ")?;
                if let Err(err) = analyse_file(&analyzer, Path::new(&path)) {
                    println!("Could not analyse {}: {}", path, err);
                }
            }
            Some('q') => return Ok(()),
            _ => println!("Unknown answer given"),
        }
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    stdout().flush()?;

    let mut buffer = String::new();
    if stdin().read_line(&mut buffer)? == 0 {
        return Err(anyhow!("input closed"));
    }
    Ok(buffer.trim().to_string())
}

fn ask_yes_no(message: &str) -> Result<bool> {
    loop {
        match prompt(message)?.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

fn analysis_control(analyzer: &Analyzer) -> SearchControl {
    match analyzer.config().search.time_limit() {
        Some(limit) => SearchControl::unbounded().with_time_limit(limit),
        None => SearchControl::unbounded(),
    }
}

fn show_analysis(analyzer: &Analyzer, board: &Board, to_move: Piece) -> Result<()> {
    let start = Instant::now();
    let outcome = analyzer.evaluate(
        board,
        Some(to_move),
        analyzer.config().search.mate_depth,
        &analysis_control(analyzer),
    );

    draw_board(board, &outcome.winning_cells)?;
    draw_evaluation(&outcome, board, &analyzer.config().weights)?;

    if !board.is_terminal() {
        let rankings = analyzer.rank_moves(board, to_move);
        let moves: Vec<String> = rankings
            .iter()
            .map(|ranking| {
                if ranking.wins {
                    format!("{}: winning move!", ranking.column + 1)
                } else {
                    format!("{}: {:+.1}", ranking.column + 1, ranking.score as f64 / 10.0)
                }
            })
            .collect();
        println!("Best moves for {}: {}", to_move.name(), moves.join(", "));
    }
    println!("Analysis took {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn play(analyzer: &Analyzer) -> Result<()> {
    let ai_players = (
        ask_yes_no("Is player 1 AI controlled? y/n: ")?,
        ask_yes_no("Is player 2 AI controlled? y/n: ")?,
    );
    let search = &analyzer.config().search;
    let weights = analyzer.config().weights;
    let mut engine = MinimaxMoveSource::new(search.minimax_depth, weights);
    let mut fallback = MinimaxMoveSource::new(1, weights);

    let mut board = Board::new();
    let mut piece = Piece::PlayerOne;

    loop {
        show_analysis(analyzer, &board, piece)?;

        if let Some(winner) = board.winner() {
            println!("{} wins!", winner.name());
            return Ok(());
        }
        if board.is_full() {
            println!("Draw!");
            return Ok(());
        }

        let is_ai = match piece {
            Piece::PlayerOne => ai_players.0,
            Piece::PlayerTwo => ai_players.1,
        };

        let column = if is_ai {
            println!("AI is thinking...");
            stdout().flush()?;

            // slow down play if both players are AI
            if ai_players == (true, true) {
                std::thread::sleep(std::time::Duration::new(1, 0));
            }

            match propose_with_fallback(&mut engine, &mut fallback, &board, piece)? {
                Some(column) => {
                    println!("{} plays column {}", engine.name(), column + 1);
                    column
                }
                None => return Err(anyhow!("no move available on a non-terminal board")),
            }
        } else {
            let input = prompt("Move input > ")?;
            match input.parse::<usize>() {
                Ok(column @ 1..=WIDTH) => column - 1,
                _ => {
                    println!("Invalid number: {}", input);
                    continue;
                }
            }
        };

        if let Err(err) = board.drop(column, piece) {
            println!("{}", err);
            // try the move again
            continue;
        }
        piece = piece.opponent();
    }
}

fn analyse_file(analyzer: &Analyzer, path: &Path) -> Result<()> {
    let file = BufReader::new(File::open(path)?);

    let mut positions = Vec::new();
    let mut boards = Vec::new();
    for line in file.lines() {
        let line = line?;
        let moves = line.trim();
        if moves.is_empty() {
            continue;
        }
        match Board::from_moves(moves) {
            Ok(board) => {
                positions.push(moves.to_string());
                boards.push(board);
            }
            Err(err) => log::warn!("skipping '{}': {}", moves, err),
        }
    }

    let start = Instant::now();
    let progress = ProgressBar::new(boards.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Analysing positions: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let outcomes = analyzer.analyze_positions(&boards, || progress.inc(1));
    progress.finish();

    for (moves, outcome) in positions.iter().zip(outcomes.iter()) {
        println!("{:<42} {}", moves, outcome);
    }
    info!(
        "analysed {} positions in {}",
        outcomes.len(),
        HumanDuration(start.elapsed())
    );
    Ok(())
}
