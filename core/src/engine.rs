use alloc::{vec, vec::Vec};
use ndarray::Array2;
use rand::{Rng, RngExt};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    NotStarted,
    Running,
}

impl SessionPhase {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::NotStarted
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    Open,
    Solved,
    Revealed,
}

impl RowStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Solved | Self::Revealed)
    }
}

impl Default for RowStatus {
    fn default() -> Self {
        Self::Open
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    puzzle: Puzzle,
    selected: Array2<bool>,
    darkened: Array2<bool>,
    row_status: Vec<RowStatus>,
    darkened_counts: Vec<CellCount>,
    phase: SessionPhase,
}

impl GameEngine {
    pub fn new(puzzle: Puzzle) -> Self {
        let dim = puzzle.size().to_nd_index();
        let rows = usize::from(puzzle.rows());
        Self {
            selected: Array2::default(dim),
            darkened: Array2::default(dim),
            row_status: vec![RowStatus::Open; rows],
            darkened_counts: vec![0; rows],
            phase: Default::default(),
            puzzle,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Opens the session. Calling it again is a no-op.
    pub fn start(&mut self) -> StartOutcome {
        use StartOutcome::*;

        if self.phase.is_running() {
            return AlreadyRunning;
        }
        self.phase = SessionPhase::Running;
        Started
    }

    pub fn row_status(&self, row: Coord) -> RowStatus {
        self.row_status[usize::from(row)]
    }

    pub fn is_selected(&self, coords: Coord2) -> bool {
        self.selected[coords.to_nd_index()]
    }

    pub fn is_darkened(&self, coords: Coord2) -> bool {
        self.darkened[coords.to_nd_index()]
    }

    pub fn selection_len(&self, row: Coord) -> CellCount {
        self.selected
            .row(usize::from(row))
            .iter()
            .filter(|&&on| on)
            .count()
            .try_into()
            .unwrap()
    }

    pub fn is_selection_complete(&self, row: Coord) -> bool {
        self.selection_len(row) == WORD_LEN
    }

    /// Set equality between a row's selection and its target columns.
    /// Meaningful only while the selection is complete.
    pub fn selection_matches(&self, row: Coord) -> bool {
        (0..self.puzzle.cols())
            .all(|col| self.is_selected((row, col)) == self.puzzle.is_target((row, col)))
    }

    pub fn darkened_count(&self, row: Coord) -> CellCount {
        self.darkened_counts[usize::from(row)]
    }

    pub fn open_rows(&self) -> impl Iterator<Item = Coord> {
        (0..self.puzzle.rows()).filter(move |&row| !self.row_status(row).is_terminal())
    }

    pub fn rows_left(&self) -> CellCount {
        self.open_rows().count().try_into().unwrap()
    }

    pub fn is_settled(&self) -> bool {
        self.open_rows().next().is_none()
    }

    pub fn can_interact_at(&self, coords: Coord2) -> bool {
        self.phase.is_running()
            && self.puzzle.contains(coords)
            && !self.row_status(coords.0).is_terminal()
    }

    pub fn cell_at(&self, coords: Coord2) -> CellState {
        match self.row_status(coords.0) {
            RowStatus::Open => {
                if self.is_selected(coords) {
                    CellState::Selected
                } else if self.is_darkened(coords) {
                    CellState::Greyed
                } else {
                    CellState::Blank
                }
            }
            RowStatus::Solved => {
                if self.puzzle.is_target(coords) {
                    CellState::Confirmed
                } else {
                    CellState::Greyed
                }
            }
            RowStatus::Revealed => {
                if self.puzzle.is_target(coords) {
                    CellState::ForcedReveal
                } else if self.is_selected(coords) {
                    // a stale pick stays visible on top of the blackout
                    CellState::Selected
                } else {
                    CellState::Greyed
                }
            }
        }
    }

    /// Flips a cell's membership in its row's selection.
    ///
    /// Out-of-range cells, rows already decided and clicks before the
    /// session opens are all forgiven as [`ToggleOutcome::Ignored`].
    /// Whenever a flip leaves the selection at exactly [`WORD_LEN`] picks,
    /// growing or shrinking onto it, it is compared with the target set; a
    /// mismatch keeps the row open with no penalty.
    pub fn toggle(&mut self, coords: Coord2) -> ToggleOutcome {
        use ToggleOutcome::*;

        if !self.can_interact_at(coords) {
            return Ignored;
        }

        let slot = &mut self.selected[coords.to_nd_index()];
        *slot = !*slot;
        let now_selected = *slot;

        let (row, _) = coords;
        if self.is_selection_complete(row) && self.selection_matches(row) {
            self.settle_solved(row);
            return Solved;
        }

        if now_selected { Selected } else { Deselected }
    }

    /// One step of the blackout process: pick an open row uniformly at
    /// random, darken one of its remaining decoys, and force-reveal the row
    /// once no decoy is left.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> TickOutcome {
        use TickOutcome::*;

        if !self.phase.is_running() {
            return Idle;
        }

        let open: SmallVec<[Coord; 16]> = self.open_rows().collect();
        if open.is_empty() {
            return Idle;
        }
        let row = open[rng.random_range(0..open.len())];

        let candidates: SmallVec<[Coord; 16]> = self
            .puzzle
            .decoy_cols(row)
            .filter(|&col| !self.darkened[(row, col).to_nd_index()])
            .collect();
        if candidates.is_empty() {
            // only reachable when a row has no decoys at all
            log::warn!("row {} has nothing left to black out", row);
            return Idle;
        }

        let cell = (row, candidates[rng.random_range(0..candidates.len())]);
        self.darkened[cell.to_nd_index()] = true;
        self.darkened_counts[usize::from(row)] += 1;

        if self.darkened_count(row) == self.puzzle.decoys_per_row() {
            self.row_status[usize::from(row)] = RowStatus::Revealed;
            log::debug!("row {} exhausted, revealing {}", row, self.puzzle.row_word(row));
            ForcedReveal(cell)
        } else {
            Darkened(cell)
        }
    }

    fn settle_solved(&mut self, row: Coord) {
        self.row_status[usize::from(row)] = RowStatus::Solved;
        for col in 0..self.puzzle.cols() {
            if !self.puzzle.is_target((row, col)) {
                self.darkened[(row, col).to_nd_index()] = true;
            }
        }
        // a solved row resolves at once; no decoy stays interactive
        self.darkened_counts[usize::from(row)] = self.puzzle.decoys_per_row();
        log::debug!("row {} solved ({})", row, self.puzzle.row_word(row));
    }
}
