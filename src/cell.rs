use serde::{Deserialize, Serialize};

/// Internal per-cell state tracked by the board grid. Mine membership and
/// adjacency counts live in `MineField`, not here.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum CellState {
    Hidden,
    Flagged,
    Opened(u8),
}

impl CellState {
    pub(crate) const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Player-visible view of a single cell, as exposed to rendering
/// collaborators. Mines are only disclosed once the game is lost.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Opened(u8),
    /// A mine disclosed after the game was lost.
    Mine,
    /// The mine whose reveal ended the game.
    Exploded,
}

impl CellView {
    pub const fn is_opened(self) -> bool {
        matches!(self, Self::Opened(_))
    }
}
