#![no_std]

extern crate alloc;

use alloc::string::String;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod types;

/// Length of every hidden target word, in letters.
pub const WORD_LEN: CellCount = 5;

/// Immutable board data: the letter grid and, per row, the mask of the
/// columns spelling the hidden target word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    letters: Array2<char>,
    targets: Array2<bool>,
}

impl Puzzle {
    /// Builds a board from one string per row plus one solution set per row.
    ///
    /// Each solution must name exactly [`WORD_LEN`] distinct columns inside
    /// the row. The grid must be rectangular and non-empty.
    pub fn from_rows(rows: &[&str], solutions: &[&[Coord]]) -> Result<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(GameError::EmptyGrid);
        }
        if height > usize::from(Coord::MAX) {
            return Err(GameError::GridTooLarge);
        }

        let width = rows[0].chars().count();
        if width == 0 {
            return Err(GameError::EmptyGrid);
        }
        if width > usize::from(Coord::MAX) {
            return Err(GameError::GridTooLarge);
        }

        let mut letters = Array2::from_elem((height, width), ' ');
        for (row, text) in rows.iter().enumerate() {
            let mut seen = 0;
            for (col, letter) in text.chars().enumerate() {
                if col >= width {
                    return Err(GameError::RaggedGrid);
                }
                letters[(row, col)] = letter;
                seen += 1;
            }
            if seen != width {
                return Err(GameError::RaggedGrid);
            }
        }

        if solutions.len() != height {
            return Err(GameError::SolutionRowMismatch);
        }

        let mut targets: Array2<bool> = Array2::default((height, width));
        for (row, cols) in solutions.iter().enumerate() {
            if cols.len() != usize::from(WORD_LEN) {
                return Err(GameError::WrongSolutionSize);
            }
            for &col in *cols {
                if usize::from(col) >= width {
                    return Err(GameError::SolutionOutOfBounds);
                }
                let slot = &mut targets[(row, usize::from(col))];
                if *slot {
                    return Err(GameError::DuplicateSolutionColumn);
                }
                *slot = true;
            }
        }

        Ok(Self { letters, targets })
    }

    /// The classic seven-row board hiding Dutch color words.
    pub fn classic() -> Self {
        Self::from_rows(
            &[
                "AFGEBROKEN",
                "ZWEMPARTIJ",
                "BRUTOWINST",
                "BEGINGETAL",
                "TOPSALARIS",
                "TAMBOERIJN",
                "KOEPELZAAL",
            ],
            &[
                &[2, 5, 6, 8, 9], // GROEN
                &[0, 1, 5, 6, 7], // ZWART
                &[0, 1, 2, 6, 7], // BRUIN
                &[0, 1, 3, 5, 6], // BEIGE
                &[2, 4, 6, 7, 9], // PAARS
                &[1, 2, 3, 5, 6], // AMBER
                &[1, 3, 7, 8, 9], // OPAAL
            ],
        )
        .expect("classic board data is valid")
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.letters.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.rows(), self.cols())
    }

    /// How many non-target cells each row holds.
    pub fn decoys_per_row(&self) -> CellCount {
        CellCount::from(self.cols()) - WORD_LEN
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let (rows, cols) = self.size();
        coords.0 < rows && coords.1 < cols
    }

    pub fn letter_at(&self, coords: Coord2) -> char {
        self[coords]
    }

    pub fn is_target(&self, coords: Coord2) -> bool {
        self.targets[coords.to_nd_index()]
    }

    pub fn target_cols(&self, row: Coord) -> impl Iterator<Item = Coord> {
        (0..self.cols()).filter(move |&col| self.is_target((row, col)))
    }

    pub fn decoy_cols(&self, row: Coord) -> impl Iterator<Item = Coord> {
        (0..self.cols()).filter(move |&col| !self.is_target((row, col)))
    }

    /// The hidden word of a row, read in column order.
    pub fn row_word(&self, row: Coord) -> String {
        self.target_cols(row).map(|col| self[(row, col)]).collect()
    }
}

impl Index<Coord2> for Puzzle {
    type Output = char;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.letters[(row as usize, col as usize)]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

impl StartOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Started => true,
            Self::AlreadyRunning => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ToggleOutcome {
    /// The click changed nothing: session not started, cell out of range, or
    /// the row is already decided.
    Ignored,
    Selected,
    Deselected,
    /// The toggle completed the selection and it matched the target set.
    Solved,
}

impl ToggleOutcome {
    pub const fn has_update(self) -> bool {
        use ToggleOutcome::*;
        match self {
            Ignored => false,
            Selected => true,
            Deselected => true,
            Solved => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Nothing to do: session not started, every row decided, or the picked
    /// row had no decoys left to darken.
    Idle,
    Darkened(Coord2),
    /// The darkened cell was the row's last decoy; the row's target word is
    /// now force-revealed.
    ForcedReveal(Coord2),
}

impl TickOutcome {
    pub const fn has_update(self) -> bool {
        use TickOutcome::*;
        match self {
            Idle => false,
            Darkened(_) => true,
            ForcedReveal(_) => true,
        }
    }
}
