//! Per-frame orchestration: paint while dragging, step, redraw, recolor.
//!
//! The host calls [`TickDriver::tick`] once per animation frame and feeds
//! pointer events in between. Nothing here schedules itself; stopping the
//! loop means the host stops calling `tick`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::brush::{Brush, Surface};
use crate::cell::Cell;
use crate::color::ColorCycler;
use crate::config::{ConfigError, SimulationConfig};
use crate::step::{ChangeMask, Simulation};
use crate::Grid;

/// Rendering sink: draws one cell-sized block.
pub trait Renderer {
    fn fill_cell(&mut self, row: usize, col: usize, cell: Cell);
}

impl<F: FnMut(usize, usize, Cell)> Renderer for F {
    fn fill_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self(row, col, cell);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Last known pointer position in surface pixels, plus the drag state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CursorState {
    pub position: Option<(f64, f64)>,
    pub drag: DragState,
}

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Cells painted by the held brush this tick.
    pub painted: usize,
    /// Cells handed to the renderer.
    pub redrawn: usize,
}

#[derive(Debug)]
pub struct TickDriver<R = SmallRng> {
    config: SimulationConfig,
    brush: Brush,
    sim: Simulation,
    colors: ColorCycler,
    cursor: CursorState,
    /// Cells painted since the last render.
    painted: ChangeMask,
    full_redraw: bool,
    ticks: u64,
    rng: R,
}

impl TickDriver<SmallRng> {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` is invalid or the surface
    /// holds no whole cell.
    pub fn new(config: SimulationConfig, surface: Surface, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, surface, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TickDriver<R> {
    /// # Errors
    ///
    /// Same as [`TickDriver::new`].
    pub fn with_rng(
        config: SimulationConfig,
        surface: Surface,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (rows, cols) = config.grid_dimensions(surface.width, surface.height)?;
        let brush = Brush {
            radius: config.brush_radius,
            cell_pitch: config.cell_pitch,
            surface,
        };
        let colors = ColorCycler::new(config.hue_increment, config.saturation, config.lightness);
        Ok(Self {
            config,
            brush,
            sim: Simulation::new(rows, cols),
            colors,
            cursor: CursorState::default(),
            painted: ChangeMask::new(rows, cols),
            full_redraw: true,
            ticks: 0,
            rng,
        })
    }

    /// Start dragging and paint once under the pointer.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> usize {
        self.cursor.position = Some((x, y));
        self.cursor.drag = DragState::Dragging;
        self.paint_at_cursor()
    }

    /// Track the pointer; never paints by itself.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.cursor.position = Some((x, y));
    }

    pub fn pointer_up(&mut self) {
        self.cursor.drag = DragState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.cursor.drag = DragState::Idle;
    }

    /// Run one frame and hand every changed cell to `renderer`.
    ///
    /// The first tick, and the first after [`TickDriver::clear`] or
    /// [`TickDriver::request_full_redraw`], redraws every cell.
    pub fn tick(&mut self, renderer: &mut impl Renderer) -> TickStats {
        let painted = match self.cursor.drag {
            DragState::Dragging => self.paint_at_cursor(),
            DragState::Idle => 0,
        };

        self.sim.step(&self.config, &mut self.rng);
        if self.full_redraw {
            self.sim.mask_mut().mark_all();
            self.full_redraw = false;
        } else {
            self.sim.mask_mut().merge(&self.painted);
        }
        self.painted.clear();

        let grid = self.sim.grid();
        let mut redrawn = 0;
        for (row, col) in self.sim.mask().iter() {
            renderer.fill_cell(row, col, grid.cells()[grid.index(row, col)]);
            redrawn += 1;
        }

        self.colors.advance();
        self.ticks += 1;
        TickStats { painted, redrawn }
    }

    /// Empty the grid and redraw everything next tick.
    pub fn clear(&mut self) {
        self.sim.grid_mut().clear();
        self.painted.clear();
        self.full_redraw = true;
        console_log!("grid cleared after {} ticks", self.ticks);
    }

    pub fn request_full_redraw(&mut self) {
        self.full_redraw = true;
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.sim.grid()
    }

    /// Mask rendered by the last tick.
    #[must_use]
    pub fn mask(&self) -> &ChangeMask {
        self.sim.mask()
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.cursor.drag
    }

    #[must_use]
    pub fn hue(&self) -> f32 {
        self.colors.hue()
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.sim.grid().occupied_count()
    }

    fn paint_at_cursor(&mut self) -> usize {
        let Some((x, y)) = self.cursor.position else {
            return 0;
        };
        let color = self.colors.current();
        let painted = &mut self.painted;
        self.brush
            .paint_at(self.sim.grid_mut(), x, y, color, |row, col| painted.mark(row, col))
    }
}
