//! Falling sand painting engine.

#[macro_use]
mod log;

pub mod api;
pub mod brush;
pub mod cell;
pub mod color;
pub mod config;
pub mod driver;
mod sand;
pub mod step;
pub mod universe;

use std::fmt;

use cell::Cell;
use thiserror::Error;
use wasm_bindgen::prelude::*;

pub use config::{ConfigError, SimulationConfig};
pub use driver::{DragState, Renderer, TickDriver};
pub use step::{step, ChangeMask, Simulation};
pub use universe::Universe;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: i32,
        col: i32,
        rows: usize,
        cols: usize,
    },
}

/// Fixed `rows × cols` cell buffer, row 0 at the top.
///
/// Dimensions are set at construction and never change. Out-of-bounds
/// reads return `None`; out-of-bounds writes are rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && (row as usize) < self.rows && col >= 0 && (col as usize) < self.cols
    }

    #[must_use]
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if self.in_bounds(row, col) {
            Some(self.cells[self.index(row as usize, col as usize)])
        } else {
            None
        }
    }

    /// True only for in-bounds empty cells; off-grid counts as occupied.
    #[must_use]
    pub fn is_vacant(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_some_and(Cell::is_empty)
    }

    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when `(row, col)` is off-grid.
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> Result<(), GridError> {
        if !self.in_bounds(row, col) {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let idx = self.index(row as usize, col as usize);
        self.cells[idx] = cell;
        Ok(())
    }

    /// Row-major cell storage.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_occupied()).count()
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    pub(crate) fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols.max(1)) {
            for cell in row {
                f.write_str(if cell.is_empty() { "." } else { "#" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Install the console panic hook and announce the engine.
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    console_log!("sandfall {} initialized", env!("CARGO_PKG_VERSION"));
}

#[wasm_bindgen]
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
