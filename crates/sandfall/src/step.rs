//! One simulation step over a double buffer, plus the redraw mask.
//!
//! Rows are scanned bottom-to-top (the bottom row never moves), each row
//! left-to-right. Every occupied source cell is visited once and writes
//! exactly one cell of the next buffer: below, a diagonal below, or its
//! own position. Destinations are checked against the next buffer, so
//! whichever source is scanned first claims a contested cell.

use rand::Rng;

use crate::api::StepApi;
use crate::cell::Cell;
use crate::config::SimulationConfig;
use crate::sand;
use crate::Grid;

/// Per-cell redraw flags, same shape as the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeMask {
    rows: usize,
    cols: usize,
    bits: Vec<bool>,
}

impl ChangeMask {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bits: vec![false; rows * cols],
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

    /// False for off-grid coordinates.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.bits[row * self.cols + col]
    }

    pub fn mark(&mut self, row: usize, col: usize) {
        if row < self.rows && col < self.cols {
            self.bits[row * self.cols + col] = true;
        }
    }

    pub fn mark_all(&mut self) {
        self.bits.fill(true);
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// OR `other` into `self`. Masks must share a shape.
    pub fn merge(&mut self, other: &ChangeMask) {
        debug_assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        for (bit, &theirs) in self.bits.iter_mut().zip(&other.bits) {
            *bit |= theirs;
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    #[must_use]
    pub fn is_clear(&self) -> bool {
        !self.bits.contains(&true)
    }

    /// `(row, col)` of every marked cell, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, &bit)| bit)
            .map(move |(idx, _)| (idx / cols, idx % cols))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }
}

/// Compute the next grid from `current` into `next`, and the redraw mask.
///
/// `moved` is scratch space for the "already moved" flags; it is resized
/// and reset here. The mask is true wherever the rendered color of
/// `current` and `next` differs, and across the whole bottom row.
///
/// # Panics
///
/// Panics if `next` or `mask` do not match `current`'s dimensions, or if
/// `config` fails [`SimulationConfig::validate`] (a move chance outside
/// `[0, 1]` or NaN).
pub fn step_into<R: Rng>(
    current: &Grid,
    next: &mut Grid,
    moved: &mut Vec<bool>,
    mask: &mut ChangeMask,
    config: &SimulationConfig,
    rng: &mut R,
) {
    debug_assert!(config.validate().is_ok(), "unvalidated config: {config:?}");
    let (rows, cols) = (current.rows(), current.cols());
    assert_eq!((next.rows(), next.cols()), (rows, cols), "next buffer shape");
    assert_eq!((mask.rows(), mask.cols()), (rows, cols), "mask shape");
    if rows == 0 || cols == 0 {
        return;
    }

    let floor = current.index(rows - 1, 0);
    next.cells_mut()[..floor].fill(Cell::Empty);
    next.cells_mut()[floor..].copy_from_slice(&current.cells()[floor..]);
    moved.clear();
    moved.resize(rows * cols, false);

    for row in (0..rows - 1).rev() {
        for col in 0..cols {
            let idx = current.index(row, col);
            if current.cells()[idx].is_empty() || moved[idx] {
                continue;
            }
            let mut api = StepApi::new(current, next, moved, rng, row as i32, col as i32);
            sand::update_sand(&mut api, config);
        }
    }

    let cells = current.cells().iter().zip(next.cells());
    for (bit, (before, after)) in mask.bits.iter_mut().zip(cells) {
        *bit = before != after && before.rgb() != after.rgb();
    }
    mask.bits[floor..].fill(true);
}

/// Allocating form of [`step_into`]: returns the new grid and its mask.
///
/// # Panics
///
/// Panics on a config that fails [`SimulationConfig::validate`].
pub fn step<R: Rng>(grid: &Grid, config: &SimulationConfig, rng: &mut R) -> (Grid, ChangeMask) {
    let mut next = Grid::new(grid.rows(), grid.cols());
    let mut mask = ChangeMask::new(grid.rows(), grid.cols());
    let mut moved = Vec::new();
    step_into(grid, &mut next, &mut moved, &mut mask, config, rng);
    (next, mask)
}

/// Two fixed grids swapped each step, with reusable scratch and mask.
#[derive(Debug)]
pub struct Simulation {
    current: Grid,
    next: Grid,
    moved: Vec<bool>,
    mask: ChangeMask,
}

impl Simulation {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            current: Grid::new(rows, cols),
            next: Grid::new(rows, cols),
            moved: vec![false; rows * cols],
            mask: ChangeMask::new(rows, cols),
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.current
    }

    /// Live grid, for painting between steps.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.current
    }

    /// Mask produced by the last [`Simulation::step`].
    #[must_use]
    pub fn mask(&self) -> &ChangeMask {
        &self.mask
    }

    pub fn mask_mut(&mut self) -> &mut ChangeMask {
        &mut self.mask
    }

    /// Advance one step and swap buffers.
    ///
    /// # Panics
    ///
    /// Panics on a config that fails [`SimulationConfig::validate`].
    pub fn step<R: Rng>(&mut self, config: &SimulationConfig, rng: &mut R) -> &ChangeMask {
        step_into(
            &self.current,
            &mut self.next,
            &mut self.moved,
            &mut self.mask,
            config,
            rng,
        );
        std::mem::swap(&mut self.current, &mut self.next);
        &self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Color;
    use crate::test_util::grid_from;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn config(vertical: f64, lateral: f64) -> SimulationConfig {
        SimulationConfig {
            vertical_move_chance: vertical,
            lateral_move_chance: lateral,
            ..SimulationConfig::default()
        }
    }

    fn rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    fn occupied(grid: &Grid) -> Vec<(usize, usize)> {
        grid.cells()
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_occupied())
            .map(|(idx, _)| (idx / grid.cols(), idx % grid.cols()))
            .collect()
    }

    fn sorted_colors(grid: &Grid) -> Vec<(u16, u8, u8)> {
        let mut colors: Vec<_> = grid
            .cells()
            .iter()
            .filter_map(|cell| cell.color())
            .map(|c| (c.hue, c.saturation, c.lightness))
            .collect();
        colors.sort_unstable();
        colors
    }

    /// Grid of arbitrary cells with per-cell colors.
    fn arb_grid(rows: usize, cols: usize) -> impl Strategy<Value = Grid> {
        proptest::collection::vec(proptest::option::weighted(0.4, 0u16..360), rows * cols).prop_map(
            move |hues| {
                let mut grid = Grid::new(rows, cols);
                for (idx, hue) in hues.into_iter().enumerate() {
                    if let Some(hue) = hue {
                        let cell = Cell::Occupied(Color::new(hue, 80, 50));
                        grid.set((idx / cols) as i32, (idx % cols) as i32, cell).unwrap();
                    }
                }
                grid
            },
        )
    }

    #[test]
    fn painted_cell_falls_one_row() {
        let mut grid = Grid::new(4, 4);
        let color = Color::new(120, 80, 50);
        crate::brush::paint(&mut grid, 0, 1, 0, color);
        assert_eq!(grid.get(0, 1), Some(Cell::Occupied(color)));

        let (next, mask) = step(&grid, &config(1.0, 0.0), &mut rng(0));
        assert_eq!(next.get(1, 1), Some(Cell::Occupied(color)));
        assert_eq!(next.get(0, 1), Some(Cell::Empty));
        assert_eq!(next.occupied_count(), 1);
        assert!(mask.get(0, 1));
        assert!(mask.get(1, 1));
        assert!(!mask.get(0, 0));
    }

    #[test]
    fn neighbours_fall_side_by_side() {
        let grid = grid_from(&[".##.", "....", "....", "...."]);
        let (next, _) = step(&grid, &config(1.0, 0.0), &mut rng(0));
        assert_eq!(next.to_string(), "....\n.##.\n....\n....\n");
    }

    #[test]
    fn left_edge_cell_never_leaves_the_grid() {
        let grid = grid_from(&["#...", "....", "....", "...."]);
        for seed in 0..64 {
            let (next, _) = step(&grid, &config(0.0, 1.0), &mut rng(seed));
            assert_eq!(occupied(&next), vec![(1, 1)]);
        }
    }

    #[test]
    fn right_edge_cell_never_leaves_the_grid() {
        let grid = grid_from(&["...#", "....", "....", "...."]);
        for seed in 0..64 {
            let (next, _) = step(&grid, &config(0.0, 1.0), &mut rng(seed));
            assert_eq!(occupied(&next), vec![(1, 2)]);
        }
    }

    #[test]
    fn first_scanned_source_claims_a_contested_cell() {
        // Both top cells can only land on (1, 1); the left one is scanned first.
        let mut grid = grid_from(&["#.#", "#.#", "###"]);
        grid.set(0, 0, Cell::Occupied(Color::new(10, 80, 50))).unwrap();
        grid.set(0, 2, Cell::Occupied(Color::new(200, 80, 50))).unwrap();
        for seed in 0..32 {
            let (next, _) = step(&grid, &config(0.0, 1.0), &mut rng(seed));
            assert_eq!(next.to_string(), "..#\n###\n###\n");
            assert_eq!(next.get(1, 1), Some(Cell::Occupied(Color::new(10, 80, 50))));
            assert_eq!(next.get(0, 2), Some(Cell::Occupied(Color::new(200, 80, 50))));
        }
    }

    #[test]
    fn column_falls_as_a_unit() {
        let grid = grid_from(&["#", "#", ".", "."]);
        let (next, _) = step(&grid, &config(1.0, 0.0), &mut rng(0));
        assert_eq!(next.to_string(), ".\n#\n#\n.\n");
    }

    #[test]
    fn floor_row_is_always_marked() {
        let grid = Grid::new(3, 5);
        let (next, mask) = step(&grid, &config(1.0, 1.0), &mut rng(0));
        assert_eq!(next, grid);
        assert_eq!(mask.count(), 5);
        assert!((0..5).all(|col| mask.get(2, col)));
    }

    #[test]
    fn single_row_grid_never_changes() {
        let grid = grid_from(&["#.#."]);
        let (next, mask) = step(&grid, &config(1.0, 1.0), &mut rng(0));
        assert_eq!(next, grid);
        assert_eq!(mask.count(), 4);
    }

    #[test]
    fn simulation_swaps_buffers() {
        let mut sim = Simulation::new(3, 1);
        sim.grid_mut().set(0, 0, Cell::Occupied(Color::new(0, 80, 50))).unwrap();
        let cfg = config(1.0, 0.0);
        let mut rng = rng(0);

        sim.step(&cfg, &mut rng);
        assert_eq!(sim.grid().to_string(), ".\n#\n.\n");
        assert_eq!(sim.mask().iter().collect::<Vec<_>>(), vec![(0, 0), (1, 0), (2, 0)]);

        sim.step(&cfg, &mut rng);
        assert_eq!(sim.grid().to_string(), ".\n.\n#\n");

        sim.step(&cfg, &mut rng);
        assert_eq!(sim.grid().to_string(), ".\n.\n#\n");
        assert_eq!(sim.mask().iter().collect::<Vec<_>>(), vec![(2, 0)]);
    }

    #[test]
    fn black_on_black_is_not_redrawn() {
        let black = Color::new(0, 80, 0);
        assert_eq!(Cell::Occupied(black).rgb(), Cell::Empty.rgb());
        let mut grid = Grid::new(3, 3);
        grid.set(0, 1, Cell::Occupied(black)).unwrap();

        let (next, mask) = step(&grid, &config(1.0, 0.0), &mut rng(0));
        assert_eq!(next.get(1, 1), Some(Cell::Occupied(black)));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![(2, 0), (2, 1), (2, 2)]);
    }

    #[test]
    #[should_panic]
    fn out_of_range_chance_panics() {
        let grid = grid_from(&[".#.", "...", "..."]);
        step(&grid, &config(1.5, 0.5), &mut rng(0));
    }

    #[test]
    fn mask_merge_and_iter() {
        let mut a = ChangeMask::new(2, 2);
        let mut b = ChangeMask::new(2, 2);
        a.mark(0, 1);
        b.mark(1, 0);
        b.mark(5, 5);
        a.merge(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![(0, 1), (1, 0)]);
        a.clear();
        assert!(a.is_clear());
        a.mark_all();
        assert_eq!(a.count(), 4);
    }

    proptest! {
        #[test]
        fn prop_step_conserves_mass_and_colors(
            grid in arb_grid(12, 12),
            vertical in 0.0f64..=1.0,
            lateral in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let (next, _) = step(&grid, &config(vertical, lateral), &mut rng(seed));
            prop_assert_eq!(next.occupied_count(), grid.occupied_count());
            prop_assert_eq!(sorted_colors(&next), sorted_colors(&grid));
        }
    }

    proptest! {
        #[test]
        fn prop_every_cell_moves_at_most_one_row_down(
            grid in arb_grid(10, 10),
            seed in any::<u64>(),
        ) {
            let (next, _) = step(&grid, &config(0.7, 0.7), &mut rng(seed));
            // Each new occupant has a source at its own spot or one row above,
            // at most one column away.
            for (row, col) in occupied(&next) {
                let from_above = row > 0
                    && (col.saturating_sub(1)..=(col + 1).min(9))
                        .any(|c| grid.get(row as i32 - 1, c as i32).is_some_and(Cell::is_occupied));
                let stayed = grid.get(row as i32, col as i32).is_some_and(Cell::is_occupied);
                prop_assert!(from_above || stayed);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_floor_row_is_untouched(grid in arb_grid(8, 8), seed in any::<u64>()) {
            let (next, _) = step(&grid, &config(1.0, 1.0), &mut rng(seed));
            prop_assert_eq!(&next.cells()[56..], &grid.cells()[56..]);
        }
    }

    proptest! {
        #[test]
        fn prop_mask_marks_exactly_the_differences(
            grid in arb_grid(10, 10),
            seed in any::<u64>(),
        ) {
            let (next, mask) = step(&grid, &config(0.8, 0.5), &mut rng(seed));
            for row in 0..9 {
                for col in 0..10 {
                    let before = grid.get(row, col).map(Cell::rgb);
                    let differs = before != next.get(row, col).map(Cell::rgb);
                    prop_assert_eq!(mask.get(row as usize, col as usize), differs);
                }
            }
            prop_assert!((0..10).all(|col| mask.get(9, col)));
        }
    }

    proptest! {
        #[test]
        fn prop_settled_pile_is_stable(seed in any::<u64>()) {
            // A full bottom half has nowhere to go.
            let mut grid = Grid::new(6, 6);
            for row in 3..6 {
                for col in 0..6 {
                    grid.set(row, col, Cell::Occupied(Color::new(30, 80, 50))).unwrap();
                }
            }
            let (next, mask) = step(&grid, &config(1.0, 1.0), &mut rng(seed));
            prop_assert_eq!(&next, &grid);
            prop_assert_eq!(mask.count(), 6);
        }
    }

    proptest! {
        #[test]
        fn prop_double_buffer_matches_allocating_step(
            grid in arb_grid(8, 8),
            seed in any::<u64>(),
        ) {
            let cfg = config(0.6, 0.6);
            let (expected, expected_mask) = step(&grid, &cfg, &mut rng(seed));

            let mut sim = Simulation::new(8, 8);
            sim.grid_mut().cells_mut().copy_from_slice(grid.cells());
            let mask = sim.step(&cfg, &mut rng(seed)).clone();
            prop_assert_eq!(sim.grid(), &expected);
            prop_assert_eq!(mask, expected_mask);
        }
    }
}
