use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Mine density above which rejection sampling starts retrying a lot.
const DENSE_BOARD_PERCENT: u32 = 80;

/// Uniform placement by rejection sampling: draw `(row, col)` pairs and retry on mines or
/// blocked cells until enough mines are down.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    #[cfg(feature = "std")]
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, config: GameConfig, blocked: &[Coord2]) -> MineLayout {
        let (rows, cols) = config.size();
        let mut blocked_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        for &coords in blocked {
            if let Some(is_blocked) = blocked_mask.get_mut(coords.to_nd_index()) {
                *is_blocked = true;
            }
        }

        let free_cells = blocked_mask.iter().filter(|&&is_blocked| !is_blocked).count();
        let requested = usize::from(config.mines());
        let target = if requested > free_cells {
            log::warn!(
                "Not enough free cells for mines, requested {} but only {} are free",
                requested,
                free_cells
            );
            free_cells
        } else {
            requested
        };

        if (target as u32) * 100 > (config.total_cells() as u32) * DENSE_BOARD_PERCENT {
            log::warn!(
                "Placing {} mines on {} cells, placement may retry for a while",
                target,
                config.total_cells()
            );
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        let mut placed = 0;
        let mut attempts: u64 = 0;
        while placed < target {
            attempts += 1;
            let index = (self.rng.random_range(0..rows), self.rng.random_range(0..cols))
                .to_nd_index();
            if mine_mask[index] || blocked_mask[index] {
                continue;
            }
            mine_mask[index] = true;
            placed += 1;
        }

        log::debug!("Placed {} mines after {} draws", placed, attempts);
        MineLayout::from_mine_mask(mine_mask)
    }
}
