use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;

use super::*;

/// Uniform sampling without replacement via a partial inside-out shuffle of
/// the cell index array. Every n-subset of cells is equally likely.
#[derive(Clone, Debug)]
pub struct RandomMinePlacer {
    rng: SmallRng,
}

impl RandomMinePlacer {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::try_from_rng(&mut rand::rngs::SysRng)
                .expect("failed to seed RNG from system entropy"),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MinePlacer for RandomMinePlacer {
    fn place(&mut self, config: &BoardConfig) -> MineField {
        let total = config.total_cells() as usize;
        let mine_target = (config.mine_count() as usize).min(total);
        let cols = config.cols as usize;

        // Partial Fisher-Yates: after i swaps, indices[..i] is a uniform
        // i-subset of [0, total). Tolerates 0 mines and a full board.
        let mut indices: Vec<usize> = (0..total).collect();
        let mut mines: Array2<bool> = Array2::default(config.size().to_nd_index());
        for i in 0..mine_target {
            let j = self.rng.random_range(i..total);
            indices.swap(i, j);
            let cell = indices[i];
            mines[[cell / cols, cell % cols]] = true;
        }

        let field = MineField::from_mine_mask(mines);
        if field.mine_count() as usize != mine_target {
            log::warn!(
                "Placed mine count mismatch, actual: {}, requested: {}",
                field.mine_count(),
                mine_target
            );
        }
        log::debug!(
            "Placed {} mines on a {}x{} field",
            field.mine_count(),
            config.rows,
            config.cols
        );
        field
    }
}
