use alloc::collections::VecDeque;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cell::CellState;
use crate::events::EventBus;
use crate::*;

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Lost
///
/// Terminal states are never left.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::InProgress
    }
}

/// The board engine: owns the grid and all counters, exposes the reveal and
/// flag operations, and publishes change notifications to subscribers.
///
/// Not designed for concurrent mutation; callers serialize access.
pub struct Board {
    config: BoardConfig,
    minefield: MineField,
    grid: Array2<CellState>,
    cells_remaining: CellCount,
    mines_to_flag: isize,
    outcome: Outcome,
    exploded: Option<Coord2>,
    placer: RandomMinePlacer,
    bus: EventBus,
}

impl Board {
    pub fn new(rows: Coord, cols: Coord, mine_probability: f64) -> Result<Self> {
        let config = BoardConfig::new(rows, cols, mine_probability)?;
        Ok(Self::with_placer(config, RandomMinePlacer::from_entropy()))
    }

    /// Like [`Board::new`] but with a deterministic mine layout per seed.
    pub fn with_seed(rows: Coord, cols: Coord, mine_probability: f64, seed: u64) -> Result<Self> {
        let config = BoardConfig::new(rows, cols, mine_probability)?;
        Ok(Self::with_placer(config, RandomMinePlacer::from_seed(seed)))
    }

    pub fn with_placer(config: BoardConfig, mut placer: RandomMinePlacer) -> Self {
        let minefield = placer.place(&config);
        Self::assemble(config, minefield, placer)
    }

    /// Builds a board over a forced mine layout, deriving the configuration
    /// from the layout itself. Reinitializing such a board keeps the implied
    /// mine density.
    pub fn from_minefield(minefield: MineField) -> Self {
        let (rows, cols) = minefield.size();
        let total = minefield.total_cells();
        let mine_probability = if total == 0 {
            0.0
        } else {
            minefield.mine_count() as f64 / total as f64
        };
        let config = BoardConfig {
            rows,
            cols,
            mine_probability,
        };
        Self::assemble(config, minefield, RandomMinePlacer::from_entropy())
    }

    fn assemble(config: BoardConfig, minefield: MineField, placer: RandomMinePlacer) -> Self {
        let grid = Array2::default(minefield.size().to_nd_index());
        let cells_remaining = minefield.safe_cell_count();
        let mines_to_flag = minefield.mine_count() as isize;
        Self {
            config,
            minefield,
            grid,
            cells_remaining,
            mines_to_flag,
            outcome: Outcome::InProgress,
            exploded: None,
            placer,
            bus: EventBus::default(),
        }
    }

    /// Discards the grid, runs mine placement afresh, and resets all
    /// counters and the outcome. Subscribers stay registered and receive
    /// counter-change notifications for the reset values.
    pub fn reinitialize(&mut self) {
        self.minefield = self.placer.place(&self.config);
        self.grid = Array2::default(self.minefield.size().to_nd_index());
        self.outcome = Outcome::InProgress;
        self.exploded = None;

        let old_cells = self.cells_remaining;
        self.cells_remaining = self.minefield.safe_cell_count();
        self.bus.emit(&BoardEvent::CellsToGo {
            old: old_cells,
            new: self.cells_remaining,
        });

        let old_mines = self.mines_to_flag;
        self.mines_to_flag = self.minefield.mine_count() as isize;
        self.bus.emit(&BoardEvent::MinesToFlag {
            old: old_mines,
            new: self.mines_to_flag,
        });

        log::debug!(
            "Reinitialized {}x{} board with {} mines",
            self.config.rows,
            self.config.cols,
            self.minefield.mine_count()
        );
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn rows(&self) -> Coord {
        self.config.rows
    }

    pub fn cols(&self) -> Coord {
        self.config.cols
    }

    pub fn size(&self) -> Coord2 {
        self.minefield.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.minefield.mine_count()
    }

    /// Non-mine cells not yet opened; the game is won when this reaches 0.
    pub fn cells_remaining(&self) -> CellCount {
        self.cells_remaining
    }

    /// Player-facing flag counter: starts at the mine count, moves by one
    /// per flag toggle. Deliberately not validated against actual mine
    /// positions and may go negative when the player over-flags.
    pub fn mines_to_flag(&self) -> isize {
        self.mines_to_flag
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Coordinate of the mine that ended the game, if it was lost.
    pub fn exploded_at(&self) -> Option<Coord2> {
        self.exploded
    }

    /// Player-visible state of one cell. Mines are disclosed only after the
    /// game is lost.
    ///
    /// Panics when `coords` is outside the board.
    pub fn cell_at(&self, coords: Coord2) -> CellView {
        match self.grid[coords.to_nd_index()] {
            CellState::Opened(count) => CellView::Opened(count),
            CellState::Flagged => CellView::Flagged,
            CellState::Hidden => {
                if self.outcome == Outcome::Lost && self.minefield.contains_mine(coords) {
                    if self.exploded == Some(coords) {
                        CellView::Exploded
                    } else {
                        CellView::Mine
                    }
                } else {
                    CellView::Hidden
                }
            }
        }
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F) -> SubscriberId
    where
        F: FnMut(&BoardEvent) + 'static,
    {
        self.bus.subscribe(kind, callback)
    }

    /// Removes exactly one registration made under `kind`.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriberId) -> bool {
        self.bus.unsubscribe(kind, id)
    }

    /// Reveals a hidden cell, or chord-opens around an already-opened
    /// numbered cell whose flagged-neighbor count matches its number.
    ///
    /// Re-revealing an opened cell, revealing a flagged cell, and acting
    /// after the game ended are silent no-ops, not errors.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.minefield.validate_coords(coords)?;
        if !self.outcome.is_in_progress() {
            return Ok(RevealOutcome::NoChange);
        }

        Ok(match self.grid[coords.to_nd_index()] {
            CellState::Hidden => self.uncover(coords),
            CellState::Opened(count) if count > 0 => self.chord_open(coords, count),
            _ => RevealOutcome::NoChange,
        })
    }

    /// Flips the flag on an unopened cell and moves the `mines_to_flag`
    /// counter by one. No-op on opened cells and after the game ended.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.minefield.validate_coords(coords)?;
        if !self.outcome.is_in_progress() {
            return Ok(FlagOutcome::NoChange);
        }

        Ok(match self.grid[coords.to_nd_index()] {
            CellState::Hidden => {
                self.grid[coords.to_nd_index()] = CellState::Flagged;
                self.adjust_mines_to_flag(-1);
                FlagOutcome::Changed
            }
            CellState::Flagged => {
                self.grid[coords.to_nd_index()] = CellState::Hidden;
                self.adjust_mines_to_flag(1);
                FlagOutcome::Changed
            }
            CellState::Opened(_) => FlagOutcome::NoChange,
        })
    }

    fn adjust_mines_to_flag(&mut self, delta: isize) {
        let old = self.mines_to_flag;
        self.mines_to_flag += delta;
        self.bus.emit(&BoardEvent::MinesToFlag {
            old,
            new: self.mines_to_flag,
        });
    }

    /// Opens all hidden, unflagged neighbors of an opened numbered cell when
    /// the flagged-neighbor count matches its number exactly. A misplaced
    /// flag can make this hit a mine.
    fn chord_open(&mut self, coords: Coord2, count: u8) -> RevealOutcome {
        if self.count_flagged_neighbors(coords) != count {
            return RevealOutcome::NoChange;
        }

        let targets: SmallVec<[Coord2; 8]> = self
            .minefield
            .iter_neighbors(coords)
            .filter(|&pos| self.grid[pos.to_nd_index()].is_hidden())
            .collect();

        let mut merged = RevealOutcome::NoChange;
        for pos in targets {
            if !self.outcome.is_in_progress() {
                break;
            }
            merged = merged | self.uncover(pos);
        }
        merged
    }

    /// Breadth-first cascade over an explicit work queue. Each step reveals
    /// one cell and delivers its notifications before the next step runs;
    /// the queue drains without further reveals once the outcome turns
    /// terminal.
    fn uncover(&mut self, start: Coord2) -> RevealOutcome {
        let mut to_visit = VecDeque::from([start]);
        let mut enqueued = HashSet::from([start]);
        let mut merged = RevealOutcome::NoChange;

        while let Some(coords) = to_visit.pop_front() {
            if !self.outcome.is_in_progress() {
                break;
            }
            merged = merged | self.reveal_step(coords, &mut to_visit, &mut enqueued);
        }
        merged
    }

    /// Single-cell reveal primitive; enqueues neighbors of zero-count cells.
    fn reveal_step(
        &mut self,
        coords: Coord2,
        to_visit: &mut VecDeque<Coord2>,
        enqueued: &mut HashSet<Coord2>,
    ) -> RevealOutcome {
        if !self.grid[coords.to_nd_index()].is_hidden() {
            return RevealOutcome::NoChange;
        }

        if self.minefield.contains_mine(coords) {
            self.exploded = Some(coords);
            log::debug!("Hit mine at {:?}", coords);
            self.finish(Outcome::Lost);
            return RevealOutcome::HitMine;
        }

        let count = self.minefield.adjacent_mine_count(coords);
        self.grid[coords.to_nd_index()] = CellState::Opened(count);
        let old = self.cells_remaining;
        self.cells_remaining -= 1;
        log::trace!("Opened cell at {:?}, adjacent mines: {}", coords, count);
        self.bus.emit(&BoardEvent::CellsToGo {
            old,
            new: self.cells_remaining,
        });

        if self.cells_remaining == 0 {
            self.finish(Outcome::Won);
            return RevealOutcome::Won;
        }

        if count == 0 {
            for pos in neighbors(coords, self.minefield.size()) {
                // flags block the cascade
                if self.grid[pos.to_nd_index()].is_hidden() && enqueued.insert(pos) {
                    to_visit.push_back(pos);
                }
            }
        }
        RevealOutcome::Revealed
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.minefield
            .iter_neighbors(coords)
            .filter(|&pos| self.grid[pos.to_nd_index()] == CellState::Flagged)
            .count()
            .try_into()
            .unwrap()
    }

    fn finish(&mut self, outcome: Outcome) {
        if !self.outcome.is_in_progress() {
            return;
        }
        self.outcome = outcome;
        log::debug!("Game ended: {:?}", outcome);
        match outcome {
            Outcome::Won => self.bus.emit(&BoardEvent::Won(true)),
            Outcome::Lost => self.bus.emit(&BoardEvent::Lost(true)),
            Outcome::InProgress => {}
        }
    }
}
