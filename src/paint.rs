use crate::cell::Cell;
use crate::grid::Grid;
use crate::CellOffset;
use crate::ScreenOffset;

/// Map a surface position to the grid cell under it.
///
/// Uses floor division, so positions left of or above the origin land outside the grid rather
/// than on row/column `0`.
pub fn to_cell_coords(x: ScreenOffset, y: ScreenOffset, cell_size: u16) -> (CellOffset, CellOffset) {
    let size = ScreenOffset::from(cell_size.max(1));

    (x.div_euclid(size), y.div_euclid(size))
}

/// Brush state while editing a custom field.
///
/// A stroke starts on pointer press, and its color is the inverse of the cell it started on.
/// That color is kept for every cell dragged over until release.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PaintState {
    stroke: Option<Cell>,
}

impl PaintState {
    pub fn is_painting(&self) -> bool {
        self.stroke.is_some()
    }

    /// Color of the stroke in progress
    pub fn paint_color(&self) -> Option<Cell> {
        self.stroke
    }

    /// Start a stroke at `(x, y)`. A press outside the grid starts nothing.
    ///
    /// Returns whether the grid changed.
    pub fn press(&mut self, grid: &mut Grid, x: CellOffset, y: CellOffset) -> bool {
        let Some(under) = grid.get(x, y) else {
            self.stroke = None;
            return false;
        };

        let color = under.inverse();
        self.stroke = Some(color);

        grid.set(x, y, color)
    }

    /// Continue the current stroke onto `(x, y)`. Does nothing without a stroke.
    pub fn drag(&mut self, grid: &mut Grid, x: CellOffset, y: CellOffset) -> bool {
        match self.stroke {
            Some(color) => grid.set(x, y, color),
            None => false,
        }
    }

    pub fn release(&mut self) {
        self.stroke = None;
    }
}
