pub mod cell;
pub mod config;
pub mod events;
pub mod field;
pub mod grid;
pub mod input;
pub mod paint;
pub mod render;
pub mod rule_set;
pub mod session;
pub mod world;

/// Position on a drawing surface, in pixels
pub type ScreenOffset = i32;

/// Position on the grid, in cells
pub type CellOffset = i32;
