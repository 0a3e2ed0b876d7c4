use anyhow::{anyhow, Result};

use std::collections::BTreeSet;
use std::fmt;

use crate::{error::MoveError, HEIGHT, LINE_LENGTH, WIDTH};

/// One of the two sides. PlayerOne always moves first.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Piece {
    PlayerOne,
    PlayerTwo,
}

impl Piece {
    pub fn opponent(self) -> Piece {
        match self {
            Piece::PlayerOne => Piece::PlayerTwo,
            Piece::PlayerTwo => Piece::PlayerOne,
        }
    }

    pub fn cell(self) -> Cell {
        match self {
            Piece::PlayerOne => Cell::PlayerOne,
            Piece::PlayerTwo => Cell::PlayerTwo,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Piece::PlayerOne => "Player 1",
            Piece::PlayerTwo => "Player 2",
        }
    }

    fn symbol(self) -> char {
        match self {
            Piece::PlayerOne => 'X',
            Piece::PlayerTwo => 'O',
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Cell {
    PlayerOne,
    PlayerTwo,
    Empty,
}

impl Cell {
    pub fn piece(&self) -> Option<Piece> {
        match self {
            Cell::PlayerOne => Some(Piece::PlayerOne),
            Cell::PlayerTwo => Some(Piece::PlayerTwo),
            Cell::Empty => None,
        }
    }
}

/// A single placed tile, as reconstructed for winning lines
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PlayedMove {
    pub column: usize,
    pub row: usize,
    pub piece: Piece,
}

/// Returns the columns ordered from the middle outwards, as
/// the middle columns take part in the most lines
pub const fn move_order() -> [usize; WIDTH] {
    let mut move_order = [0; WIDTH];
    let mut i = 0;
    while i < WIDTH {
        move_order[i] = (WIDTH / 2) + (i % 2) * (i / 2 + 1) - (1 - i % 2) * (i / 2);
        i += 1;
    }
    move_order
}

/// Unit steps for the four line directions: horizontal, vertical, diagonal / and diagonal \
pub(crate) static DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// Every window of `LINE_LENGTH` cells on the board, as its starting
/// (row, column) and direction. Windows never leave the board.
pub(crate) fn windows() -> impl Iterator<Item = (usize, usize, (isize, isize))> {
    DIRECTIONS.iter().flat_map(|&(dr, dc)| {
        (0..HEIGHT).flat_map(move |row| {
            (0..WIDTH).filter_map(move |column| {
                let end_row = row as isize + dr * (LINE_LENGTH as isize - 1);
                let end_column = column as isize + dc * (LINE_LENGTH as isize - 1);
                if end_row < 0
                    || end_row >= HEIGHT as isize
                    || end_column < 0
                    || end_column >= WIDTH as isize
                {
                    None
                } else {
                    Some((row, column, (dr, dc)))
                }
            })
        })
    })
}

/// The cells of a window returned by `windows()`
pub(crate) fn window_cells(
    row: usize,
    column: usize,
    (dr, dc): (isize, isize),
) -> impl Iterator<Item = (usize, usize)> {
    (0..LINE_LENGTH as isize).map(move |i| {
        (
            (row as isize + dr * i) as usize,
            (column as isize + dc * i) as usize,
        )
    })
}

/// A Connect 4 position.
///
/// Rows are indexed bottom-to-top, so row 0 is where a piece dropped into an
/// empty column lands. The board is a small `Copy` value: search code plays
/// moves on its own copy for every branch.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Board {
    // cells[row][column], row 0 at the bottom
    cells: [[Cell; WIDTH]; HEIGHT],
    heights: [usize; WIDTH],
}

impl Board {
    /// Creates an empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; WIDTH]; HEIGHT],
            heights: [0; WIDTH],
        }
    }

    /// Creates a board from a string of 1-indexed column digits, with the
    /// players alternating from PlayerOne
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();
        let mut piece = Piece::PlayerOne;

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=WIDTH) => {
                    if board.winner().is_some() {
                        return Err(anyhow!("Invalid position, game is over"));
                    }
                    board.drop(column - 1, piece)?;
                    piece = piece.opponent();
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    /// Creates a board from rows written top-down, using `X` for PlayerOne,
    /// `O` for PlayerTwo and `.` for an empty cell
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        if rows.len() != HEIGHT {
            return Err(anyhow!("expected {} rows, found {}", HEIGHT, rows.len()));
        }

        let mut board = Self::new();
        for (row, line) in rows.iter().rev().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != WIDTH {
                return Err(anyhow!("row '{}' must be {} cells wide", line, WIDTH));
            }
            for (column, symbol) in line.chars().enumerate() {
                let piece = match symbol {
                    'X' | 'x' => Piece::PlayerOne,
                    'O' | 'o' => Piece::PlayerTwo,
                    '.' => continue,
                    _ => return Err(anyhow!("could not parse '{}' as a cell", symbol)),
                };
                if board.heights[column] != row {
                    return Err(anyhow!(
                        "floating piece at row {}, column {}",
                        row,
                        column
                    ));
                }
                board.drop(column, piece)?;
            }
        }
        Ok(board)
    }

    pub fn get(&self, row: usize, column: usize) -> Cell {
        self.cells[row][column]
    }

    /// The number of pieces in a column, which is also its next open row
    pub fn height(&self, column: usize) -> usize {
        self.heights[column]
    }

    pub fn playable(&self, column: usize) -> bool {
        column < WIDTH && self.heights[column] < HEIGHT
    }

    /// The columns with an open top cell, in ascending order.
    /// Empty only when the board is full.
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..WIDTH).filter(|&column| self.playable(column)).collect()
    }

    /// Drops `piece` into the lowest open row of `column` in place,
    /// returning the row it landed on
    pub fn drop(&mut self, column: usize, piece: Piece) -> Result<usize, MoveError> {
        if column >= WIDTH {
            return Err(MoveError::InvalidColumn { column });
        }
        let row = self.heights[column];
        if row >= HEIGHT {
            return Err(MoveError::ColumnFull { column });
        }
        self.cells[row][column] = piece.cell();
        self.heights[column] += 1;
        Ok(row)
    }

    /// Returns a copy of this board with `piece` dropped into `column`,
    /// and the row it landed on
    pub fn with_move(&self, column: usize, piece: Piece) -> Result<(Board, usize), MoveError> {
        let mut next = *self;
        let row = next.drop(column, piece)?;
        Ok((next, row))
    }

    pub fn is_full(&self) -> bool {
        self.heights.iter().all(|&height| height == HEIGHT)
    }

    pub fn count(&self, piece: Piece) -> usize {
        let cell = piece.cell();
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == cell)
            .count()
    }

    pub fn empty_cells(&self) -> usize {
        WIDTH * HEIGHT - self.heights.iter().sum::<usize>()
    }

    /// Infers the side to move from the piece counts
    pub fn side_to_move(&self) -> Piece {
        if self.count(Piece::PlayerOne) <= self.count(Piece::PlayerTwo) {
            Piece::PlayerOne
        } else {
            Piece::PlayerTwo
        }
    }

    fn window_is(&self, row: usize, column: usize, direction: (isize, isize), cell: Cell) -> bool {
        window_cells(row, column, direction).all(|(r, c)| self.cells[r][c] == cell)
    }

    /// Whether `piece` has four in a row anywhere on the board
    pub fn has_line(&self, piece: Piece) -> bool {
        let cell = piece.cell();
        windows().any(|(row, column, direction)| self.window_is(row, column, direction, cell))
    }

    /// Every cell belonging to any line of `piece`, as (row, column)
    pub fn winning_cells(&self, piece: Piece) -> BTreeSet<(usize, usize)> {
        let cell = piece.cell();
        windows()
            .filter(|&(row, column, direction)| self.window_is(row, column, direction, cell))
            .flat_map(|(row, column, direction)| window_cells(row, column, direction))
            .collect()
    }

    pub fn winner(&self) -> Option<Piece> {
        if self.has_line(Piece::PlayerOne) {
            Some(Piece::PlayerOne)
        } else if self.has_line(Piece::PlayerTwo) {
            Some(Piece::PlayerTwo)
        } else {
            None
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// Whether dropping `piece` into `column` completes a line through the
    /// landing cell. False for unplayable columns.
    pub fn wins_with(&self, column: usize, piece: Piece) -> bool {
        if !self.playable(column) {
            return false;
        }
        let row = self.heights[column] as isize;
        let cell = piece.cell();

        for &(dr, dc) in DIRECTIONS.iter() {
            let mut run = 1;
            for &sign in [-1isize, 1].iter() {
                let mut r = row + sign * dr;
                let mut c = column as isize + sign * dc;
                while r >= 0
                    && r < HEIGHT as isize
                    && c >= 0
                    && c < WIDTH as isize
                    && self.cells[r as usize][c as usize] == cell
                {
                    run += 1;
                    r += sign * dr;
                    c += sign * dc;
                }
            }
            if run >= LINE_LENGTH {
                return true;
            }
        }
        false
    }

    /// The first column, centre outwards, where `piece` wins immediately,
    /// with the row it would land on
    pub fn find_winning_move(&self, piece: Piece) -> Option<(usize, usize)> {
        move_order()
            .iter()
            .find(|&&column| self.wins_with(column, piece))
            .map(|&column| (column, self.heights[column]))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..HEIGHT).rev() {
            let line: String = self.cells[row]
                .iter()
                .map(|cell| cell.piece().map_or('.', Piece::symbol))
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
