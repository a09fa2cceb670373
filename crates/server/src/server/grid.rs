//! The shared cell-ownership grid.

use protocol::{Color, GRID_SIZE};
use std::collections::HashMap;

/// Fixed `GRID_SIZE` x `GRID_SIZE` matrix; each cell is unpainted or holds
/// the color of the player who last painted it.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Option<Color>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub const TOTAL_CELLS: usize = GRID_SIZE * GRID_SIZE;

    pub fn new() -> Self {
        Self {
            cells: vec![None; Self::TOTAL_CELLS],
        }
    }

    fn index(x: usize, y: usize) -> Option<usize> {
        (x < GRID_SIZE && y < GRID_SIZE).then_some(y * GRID_SIZE + x)
    }

    /// Paint cell `(x, y)`. Returns false if the coordinates are off the grid.
    pub fn paint(&mut self, x: usize, y: usize, color: Color) -> bool {
        match Self::index(x, y) {
            Some(i) => {
                self.cells[i] = Some(color);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        Self::index(x, y).and_then(|i| self.cells[i])
    }

    /// Unpaint every cell holding `color`. Returns the number of cells freed.
    pub fn clear_color(&mut self, color: Color) -> usize {
        let mut cleared = 0;
        for cell in self.cells.iter_mut().filter(|c| **c == Some(color)) {
            *cell = None;
            cleared += 1;
        }
        cleared
    }

    pub fn reset_all(&mut self) {
        self.cells.fill(None);
    }

    pub fn count_color(&self, color: Color) -> usize {
        self.cells.iter().filter(|c| **c == Some(color)).count()
    }

    /// Cell counts for every color present, in one pass.
    pub fn color_counts(&self) -> HashMap<Color, usize> {
        let mut counts = HashMap::new();
        for color in self.cells.iter().flatten() {
            *counts.entry(*color).or_insert(0) += 1;
        }
        counts
    }

    pub const fn total_cells(&self) -> usize {
        Self::TOTAL_CELLS
    }

    /// Rows indexed by `y`, as sent on the wire.
    pub fn rows(&self) -> Vec<Vec<Option<Color>>> {
        self.cells.chunks(GRID_SIZE).map(<[_]>::to_vec).collect()
    }
}

/// Percentage of the grid owned, rounded down.
pub fn score_for(owned: usize) -> u32 {
    (owned * 100 / Grid::TOTAL_CELLS) as u32
}
