use serde::{Deserialize, Serialize};

/// One grid position as stored by the engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    /// Unset until mines are placed, and always unset for mines.
    pub mines_around: Option<u8>,
}

impl Cell {
    pub const fn is_unrevealed(self) -> bool {
        !self.is_revealed
    }

    /// What a renderer should show for this cell.
    pub const fn display(self) -> CellDisplay {
        match self {
            Self {
                is_flagged: true, ..
            } => CellDisplay::Flagged,
            Self {
                is_revealed: false,
                ..
            } => CellDisplay::Hidden,
            Self { is_mine: true, .. } => CellDisplay::Mine,
            Self {
                mines_around: Some(0) | None,
                ..
            } => CellDisplay::Empty,
            Self {
                mines_around: Some(count),
                ..
            } => CellDisplay::Number(count),
        }
    }
}

/// Player-visible state of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellDisplay {
    Hidden,
    Flagged,
    Mine,
    Empty,
    Number(u8),
}

impl CellDisplay {
    /// Revealed cells no longer accept input.
    pub const fn is_interactive(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}
