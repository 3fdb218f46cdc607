use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Row-major matrix of [`Cell`]s.
///
/// Only the engine mutates a board; everyone else gets a clone through a [`Snapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.size();
        if coords.0 < rows && coords.1 < cols {
            Ok(coords)
        } else {
            Err(GameError::OutOfRange {
                row: coords.0,
                col: coords.1,
            })
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// All cells with their coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Coord2, &Cell)> {
        self.cells
            .indexed_iter()
            .map(|((row, col), cell)| ((row as Coord, col as Coord), cell))
    }

    /// Cells of a single row, left to right.
    pub fn row(&self, row: Coord) -> impl Iterator<Item = &Cell> {
        self.cells.row(row.into()).into_iter()
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.is_mine)
    }

    pub fn flagged_neighbor_count(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.is_flagged)
    }

    pub fn unrevealed_count(&self) -> CellCount {
        self.count_cells(|cell| cell.is_unrevealed())
    }

    pub fn flagged_count(&self) -> CellCount {
        self.count_cells(|cell| cell.is_flagged)
    }

    pub fn mine_count(&self) -> CellCount {
        self.count_cells(|cell| cell.is_mine)
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    /// Copies mines from `layout` and fills in `mines_around` for every safe cell.
    pub(crate) fn apply_layout(&mut self, layout: &MineLayout) {
        for ((row, col), cell) in self.cells.indexed_iter_mut() {
            cell.is_mine = layout.contains_mine((row as Coord, col as Coord));
        }

        let counts = Array2::from_shape_fn(self.cells.dim(), |(row, col)| {
            let coords = (row as Coord, col as Coord);
            if self[coords].is_mine {
                None
            } else {
                Some(self.adjacent_mine_count(coords))
            }
        });

        for (cell, count) in self.cells.iter_mut().zip(counts.iter()) {
            cell.mines_around = *count;
        }
    }

    /// Opens everything and drops all flags, used once the game is decided.
    pub(crate) fn reveal_all(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.is_revealed = true;
            cell.is_flagged = false;
        }
    }

    fn count_neighbors(&self, coords: Coord2, predicate: impl Fn(&Cell) -> bool) -> u8 {
        // never more than 8 neighbors
        self.neighbors(coords)
            .filter(|&pos| predicate(&self[pos]))
            .count() as u8
    }

    fn count_cells(&self, predicate: impl Fn(&Cell) -> bool) -> CellCount {
        self.cells.iter().filter(|cell| predicate(cell)).count() as CellCount
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}
