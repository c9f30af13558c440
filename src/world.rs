use crate::grid::Grid;
use crate::rule_set::RuleSet;
use crate::CellOffset;

/// Compute the generation following `grid`.
///
/// Every cell is computed from `grid` alone, so no cell ever sees a partially updated
/// neighbourhood.
pub fn next_generation(grid: &Grid, rules: &RuleSet) -> Grid {
    let mut next = Grid::new(grid.width(), grid.height());

    // Only cells within `CellOffset` range can be addressed. A validated `Config` keeps every
    // session grid inside it.
    let width = CellOffset::try_from(grid.width()).unwrap_or(CellOffset::MAX);
    let height = CellOffset::try_from(grid.height()).unwrap_or(CellOffset::MAX);

    for y in 0..height {
        for x in 0..width {
            let Some(cell) = grid.get(x, y) else {
                continue;
            };

            let live_neighbors = grid.count_live_neighbors(x, y);
            next.set(x, y, rules.next_state(cell, live_neighbors));
        }
    }

    next
}

pub struct World {
    /// Life rules
    rules: RuleSet,

    /// The current generation
    grid: Grid,

    /// Generations stepped since the grid was last replaced
    generation: u64,
}

impl World {
    /// Create an empty new world
    pub fn new(width: usize, height: usize, rules: RuleSet) -> Self {
        Self {
            rules,
            grid: Grid::new(width, height),
            generation: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access for in place edits. Dimensions can't be changed through this.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advance the world by one generation
    pub fn step(&mut self) {
        self.grid = next_generation(&self.grid, &self.rules);
        self.generation += 1;
    }

    /// Replace the whole grid, restarting the generation count.
    ///
    /// Returns the grid back if its dimensions don't match the world's.
    pub fn replace(&mut self, grid: Grid) -> Result<(), Grid> {
        if grid.width() != self.grid.width() || grid.height() != self.grid.height() {
            return Err(grid);
        }

        self.grid = grid;
        self.generation = 0;

        Ok(())
    }

    /// Kill every cell and restart the generation count
    pub fn reset(&mut self) {
        self.grid.clear();
        self.generation = 0;
    }
}
