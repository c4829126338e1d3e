#![no_std]

extern crate alloc;

use core::fmt;
use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::CellView;
pub use error::*;
pub use events::{BoardEvent, EventKind, SubscriberId};
pub use placement::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod events;
mod placement;
mod types;

/// Geometry and mine density of a board, fixed at construction.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mine_probability: f64,
}

impl BoardConfig {
    pub const DEFAULT_ROWS: Coord = 32;
    pub const DEFAULT_COLS: Coord = 32;
    pub const DEFAULT_PROBABILITY: f64 = 0.12;

    pub fn new(rows: Coord, cols: Coord, mine_probability: f64) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidConfiguration(
                "rows and cols must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&mine_probability) {
            return Err(GameError::InvalidConfiguration(
                "mine probability must be within [0, 1]",
            ));
        }
        Ok(Self {
            rows,
            cols,
            mine_probability,
        })
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    /// Number of mines to place: `round(rows * cols * probability)`.
    pub fn mine_count(&self) -> CellCount {
        (self.total_cells() as f64 * self.mine_probability + 0.5) as CellCount
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: Self::DEFAULT_ROWS,
            cols: Self::DEFAULT_COLS,
            mine_probability: Self::DEFAULT_PROBABILITY,
        }
    }
}

/// Mine positions plus precomputed adjacency counts. Both are immutable for
/// the lifetime of one board instance; a mine cell never carries a count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineField {
    mines: Array2<bool>,
    counts: Array2<u8>,
    mine_count: CellCount,
}

impl MineField {
    pub fn from_mine_mask(mines: Array2<bool>) -> Self {
        let dim = mines.dim();
        let bounds: Coord2 = (
            dim.0.try_into().expect("row count must fit Coord"),
            dim.1.try_into().expect("col count must fit Coord"),
        );

        let mut counts: Array2<u8> = Array2::default(dim);
        for row in 0..bounds.0 {
            for col in 0..bounds.1 {
                if !mines[(row, col).to_nd_index()] {
                    continue;
                }
                for pos in neighbors((row, col), bounds) {
                    if !mines[pos.to_nd_index()] {
                        counts[pos.to_nd_index()] += 1;
                    }
                }
            }
        }

        let mine_count = mines
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .expect("mine count must fit CellCount");

        Self {
            mines,
            counts,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoordinate);
            }
            mines[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mines))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoordinate)
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.mines.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len().try_into().unwrap()
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.counts[coords.to_nd_index()]
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> {
        neighbors(coords, self.size())
    }
}

impl Index<Coord2> for MineField {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mines[coords.to_nd_index()]
    }
}

/// Bordered ASCII dump of the whole field, mines and counts included. Debug
/// aid only, this is not a player view.
impl fmt::Display for MineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.size();

        let line = |f: &mut fmt::Formatter<'_>| {
            f.write_str("+")?;
            for _ in 0..cols {
                f.write_str("--")?;
            }
            f.write_str("-+\n")
        };

        line(f)?;
        for row in 0..rows {
            f.write_str("|")?;
            for col in 0..cols {
                if self[(row, col)] {
                    f.write_str(" @")?;
                } else {
                    match self.adjacent_mine_count((row, col)) {
                        0 => f.write_str("  ")?,
                        count => write!(f, " {count}")?,
                    }
                }
            }
            f.write_str(" |\n")?;
        }
        line(f)
    }
}

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Outcome of a reveal operation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Used to merge per-cell outcomes when a chord opens several neighbors.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}
