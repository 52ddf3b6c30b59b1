//! Disc brush that deposits sand into empty cells.
//!
//! Painting writes straight into the live grid; it is not part of the
//! step's double buffer. Occupied cells are never overwritten, so
//! painting the same disc twice is the same as painting it once.

use crate::cell::{Cell, Color};
use crate::Grid;

/// Rendering surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

impl Surface {
    /// Grid `(row, col)` under a surface point, or `None` off the surface.
    #[must_use]
    pub fn to_cell(self, x: f64, y: f64, cell_pitch: u32) -> Option<(i32, i32)> {
        let inside = (0.0..f64::from(self.width)).contains(&x)
            && (0.0..f64::from(self.height)).contains(&y);
        if !inside || cell_pitch == 0 {
            return None;
        }
        let pitch = f64::from(cell_pitch);
        Some(((y / pitch).floor() as i32, (x / pitch).floor() as i32))
    }
}

/// Paint a disc, returning how many cells went from empty to occupied.
pub fn paint(
    grid: &mut Grid,
    center_row: i32,
    center_col: i32,
    radius: u32,
    color: Color,
) -> usize {
    paint_with(grid, center_row, center_col, radius, color, |_, _| {})
}

/// [`paint`], calling `on_paint(row, col)` for every newly occupied cell.
pub fn paint_with(
    grid: &mut Grid,
    center_row: i32,
    center_col: i32,
    radius: u32,
    color: Color,
    mut on_paint: impl FnMut(usize, usize),
) -> usize {
    if grid.rows() == 0 || grid.cols() == 0 {
        return 0;
    }
    let radius = i64::from(radius);
    let (center_row, center_col) = (i64::from(center_row), i64::from(center_col));
    let last_row = grid.rows() as i64 - 1;
    let last_col = grid.cols() as i64 - 1;

    // Squared distances of a `u32` radius overflow i64.
    let radius_sq = i128::from(radius) * i128::from(radius);
    let mut painted = 0;
    for row in (center_row - radius).max(0)..=(center_row + radius).min(last_row) {
        let dr = i128::from(row - center_row);
        for col in (center_col - radius).max(0)..=(center_col + radius).min(last_col) {
            let dc = i128::from(col - center_col);
            if dr * dr + dc * dc > radius_sq {
                continue;
            }
            let (r, c) = (row as usize, col as usize);
            let idx = grid.index(r, c);
            let cell = &mut grid.cells_mut()[idx];
            if cell.is_empty() {
                *cell = Cell::Occupied(color);
                painted += 1;
                on_paint(r, c);
            }
        }
    }
    painted
}

/// Brush bound to a surface and cell pitch, painting at pointer positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    pub radius: u32,
    pub cell_pitch: u32,
    pub surface: Surface,
}

impl Brush {
    /// Paint centered under the surface point `(x, y)`. No-op off the surface.
    pub fn paint_at(
        &self,
        grid: &mut Grid,
        x: f64,
        y: f64,
        color: Color,
        on_paint: impl FnMut(usize, usize),
    ) -> usize {
        match self.surface.to_cell(x, y, self.cell_pitch) {
            Some((row, col)) => paint_with(grid, row, col, self.radius, color, on_paint),
            None => 0,
        }
    }
}
