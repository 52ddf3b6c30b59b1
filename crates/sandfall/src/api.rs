//! Relative-offset API for the per-cell movement rule.

use rand::Rng;

use crate::cell::Cell;
use crate::Grid;

/// View of one source cell during a step.
///
/// Reads of the source come from the pre-step grid; vacancy checks and
/// writes go to the buffer being built, so a destination claimed earlier
/// in the same step is no longer vacant. Off-grid offsets are never vacant.
#[derive(Debug)]
pub struct StepApi<'a, R> {
    current: &'a Grid,
    next: &'a mut Grid,
    moved: &'a mut [bool],
    rng: &'a mut R,
    pub row: i32,
    pub col: i32,
}

impl<'a, R: Rng> StepApi<'a, R> {
    pub fn new(
        current: &'a Grid,
        next: &'a mut Grid,
        moved: &'a mut [bool],
        rng: &'a mut R,
        row: i32,
        col: i32,
    ) -> Self {
        Self {
            current,
            next,
            moved,
            rng,
            row,
            col,
        }
    }

    /// The source cell as it was before the step.
    #[must_use]
    pub fn me(&self) -> Cell {
        self.current.get(self.row, self.col).unwrap_or_default()
    }

    #[must_use]
    pub fn vacant(&self, dr: i32, dc: i32) -> bool {
        self.next.is_vacant(self.row + dr, self.col + dc)
    }

    /// Move the source cell to a vacant offset and mark it moved.
    pub fn move_to(&mut self, dr: i32, dc: i32) {
        debug_assert!(self.vacant(dr, dc), "destination already claimed");
        let me = self.me();
        if self.next.set(self.row + dr, self.col + dc, me).is_ok() {
            let idx = self.source_index();
            self.moved[idx] = true;
        }
    }

    /// Copy the source cell unchanged into the next buffer.
    pub fn stay(&mut self) {
        debug_assert!(self.vacant(0, 0), "source position already claimed");
        let me = self.me();
        let _ = self.next.set(self.row, self.col, me);
    }

    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.moved[self.source_index()]
    }

    /// True with probability `p`, which must be in `[0, 1]`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p)
    }

    /// `-1` or `+1`, uniformly.
    pub fn random_direction(&mut self) -> i32 {
        if self.rng.gen_bool(0.5) {
            1
        } else {
            -1
        }
    }

    fn source_index(&self) -> usize {
        self.current.index(self.row as usize, self.col as usize)
    }
}
