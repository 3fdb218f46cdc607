use crate::*;
pub use random::*;

mod random;

/// Chooses where mines go once the first cell has been opened.
pub trait MineGenerator {
    /// Produces a layout for `config` with no mine on any `blocked` cell.
    fn generate(&mut self, config: GameConfig, blocked: &[Coord2]) -> MineLayout;
}
