use crate::*;
pub use random::*;

mod random;

/// Strategy used at construction and reinitialization to decide which cells
/// hold mines.
pub trait MinePlacer {
    fn place(&mut self, config: &BoardConfig) -> MineField;
}
