use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::cell::Cell;
use crate::grid::Grid;
use crate::grid::ShapeError;

/// Name of the `n`th exported field of a session, counting from 1
pub fn export_file_name(n: u32) -> String {
    format!("game_of_life_field_{n}.json")
}

/// On-disk layout of a field.
///
/// ```json
/// {"grid": [[0, 1, 0], [0, 0, 0]], "grid_width": 3, "grid_height": 2}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Rows of `0`/`1` cells, top row first
    pub grid: Vec<Vec<u8>>,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl FieldRecord {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            grid: grid
                .rows()
                .map(|row| row.iter().map(|c| c.as_u8()).collect())
                .collect(),
            grid_width: grid.width(),
            grid_height: grid.height(),
        }
    }

    /// Check the record against the expected dimensions and turn it into a [`Grid`].
    ///
    /// Besides the declared dimensions, the cell matrix itself must have exactly that shape and
    /// hold nothing but `0` and `1`.
    pub fn into_grid(self, width: usize, height: usize) -> Result<Grid, FieldError> {
        if self.grid_width != width || self.grid_height != height {
            return Err(FieldError::DimensionMismatch {
                width,
                height,
                got_width: self.grid_width,
                got_height: self.grid_height,
            });
        }

        let mut rows = Vec::with_capacity(self.grid.len());
        for (y, row) in self.grid.into_iter().enumerate() {
            let row = row
                .into_iter()
                .enumerate()
                .map(|(x, value)| Cell::from_u8(value).ok_or(FieldError::CellValue { x, y, value }))
                .collect::<Result<Vec<_>, _>>()?;

            rows.push(row);
        }

        Ok(Grid::from_rows(width, height, rows)?)
    }
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error(
        "Field dimensions do not match current settings: expected {width}x{height}, got {got_width}x{got_height}"
    )]
    DimensionMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },

    #[error("Invalid field file: failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid field file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid field file: {0}")]
    Shape(#[from] ShapeError),

    #[error("Invalid field file: cell ({x}, {y}) is {value}, expected 0 or 1")]
    CellValue { x: usize, y: usize, value: u8 },
}

impl FieldError {
    /// Whether the file was a well formed field, just for another grid size
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, FieldError::DimensionMismatch { .. })
    }
}

/// Reads and writes field files.
///
/// Owns the export counter: the `n`th export of a session is written to
/// [`export_file_name(n)`](export_file_name), so a session never overwrites its own exports.
#[derive(Debug)]
pub struct FieldCodec {
    dir: PathBuf,
    exported: u32,
}

impl FieldCodec {
    /// Exports go to `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            exported: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of successful exports so far
    pub fn exported(&self) -> u32 {
        self.exported
    }

    /// Write `grid` to the next numbered file and return its path.
    ///
    /// The counter only advances once the file is written.
    pub fn export(&mut self, grid: &Grid) -> Result<PathBuf, FieldError> {
        let n = self.exported + 1;
        let path = self.dir.join(export_file_name(n));

        let bytes = serde_json::to_vec(&FieldRecord::from_grid(grid))?;
        fs::write(&path, bytes).map_err(|source| FieldError::Write {
            path: path.clone(),
            source,
        })?;

        self.exported = n;
        info!(path = %path.display(), "Field exported");

        Ok(path)
    }

    /// Read the field at `path`, which must be `width` by `height`.
    pub fn import(&self, path: &Path, width: usize, height: usize) -> Result<Grid, FieldError> {
        let bytes = fs::read(path).map_err(|source| FieldError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let record: FieldRecord = serde_json::from_slice(&bytes)?;
        let grid = record.into_grid(width, height)?;

        info!(path = %path.display(), "Field imported");

        Ok(grid)
    }
}
