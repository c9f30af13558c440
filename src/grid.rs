use rand::Rng;
use thiserror::Error;

use crate::cell::Cell;
use crate::CellOffset;

/// Offsets of the Moore neighbourhood, in row-major order
const NEIGHBOURHOOD: [(CellOffset, CellOffset); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Expected {expected} rows, got {got}")]
    RowCount { expected: usize, got: usize },

    #[error("Expected {expected} cells in row {row}, got {got}")]
    RowLength {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// A fixed size field of cells.
///
/// Cells are addressed by `(x, y)`, with `x` the column and `y` the row, and the origin in the
/// top left corner. Storage is a flat row-major buffer (`y * width + x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all dead grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Dead; width * height],
        }
    }

    /// Build a grid from its rows, checking that there are exactly `height` rows of `width`
    /// cells each.
    pub fn from_rows<I, R>(width: usize, height: usize, rows: I) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = Cell>,
    {
        let mut cells = Vec::with_capacity(width * height);
        let mut got = 0;

        for row in rows {
            let start = cells.len();
            cells.extend(row);

            let len = cells.len() - start;
            if len != width {
                return Err(ShapeError::RowLength {
                    row: got,
                    expected: width,
                    got: len,
                });
            }

            got += 1;
        }

        if got != height {
            return Err(ShapeError::RowCount {
                expected: height,
                got,
            });
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Flat index of `(x, y)`, or `None` if it lies outside the grid
    fn index(&self, x: CellOffset, y: CellOffset) -> Option<usize> {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return None;
        };

        if x >= self.width || y >= self.height {
            return None;
        }

        Some(y * self.width + x)
    }

    pub fn contains(&self, x: CellOffset, y: CellOffset) -> bool {
        self.index(x, y).is_some()
    }

    pub fn get(&self, x: CellOffset, y: CellOffset) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// `false` for dead cells as well as anything outside the grid
    pub fn is_alive(&self, x: CellOffset, y: CellOffset) -> bool {
        self.get(x, y).is_some_and(Cell::is_alive)
    }

    /// Set a cell. Out of range coordinates are ignored.
    ///
    /// Returns whether the grid changed.
    pub fn set(&mut self, x: CellOffset, y: CellOffset, cell: Cell) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };

        let changed = self.cells[i] != cell;
        self.cells[i] = cell;

        changed
    }

    /// Kill every cell
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Dead);
    }

    /// Each cell independently becomes alive or dead with equal probability
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in &mut self.cells {
            *cell = Cell::from(rng.gen_bool(0.5));
        }
    }

    /// Number of live cells among the eight neighbours of `(x, y)`. Neighbours outside the grid
    /// count as dead; there is no wraparound.
    pub fn count_live_neighbors(&self, x: CellOffset, y: CellOffset) -> u8 {
        NEIGHBOURHOOD
            .iter()
            .filter_map(|&(dx, dy)| Some((x.checked_add(dx)?, y.checked_add(dy)?)))
            .filter(|&(nx, ny)| self.is_alive(nx, ny))
            .count() as u8
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // `chunks` panics on 0, and a zero width grid has no rows anyway
        self.cells.chunks(self.width.max(1))
    }

    /// Coordinates of every live cell, row by row
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| (i % self.width, i / self.width))
    }
}
