//! JS-facing wrapper: pointer events in, redraw buffers out.
//!
//! After each `tick()` the page reads `changed_len()` cell indices from
//! `changed_ptr()` and the matching packed `0xRRGGBB` colors from
//! `colors_ptr()`, straight out of wasm memory, and fills those cells on
//! its canvas. The page owns `requestAnimationFrame`.

use wasm_bindgen::prelude::*;

use crate::brush::Surface;
use crate::cell::Cell;
use crate::config::{ConfigError, SimulationConfig};
use crate::driver::{DragState, Renderer, TickDriver};

/// Changed cells of one tick, as row-major indices and packed colors.
#[derive(Debug, Default)]
pub struct RedrawBuffer {
    cols: usize,
    indices: Vec<u32>,
    colors: Vec<u32>,
}

impl RedrawBuffer {
    #[must_use]
    pub fn new(cols: usize) -> Self {
        Self {
            cols,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.colors.clear();
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }
}

impl Renderer for RedrawBuffer {
    fn fill_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.indices.push((row * self.cols + col) as u32);
        self.colors.push(cell.rgb());
    }
}

#[wasm_bindgen]
#[derive(Debug)]
pub struct Universe {
    driver: TickDriver,
    redraw: RedrawBuffer,
}

impl Universe {
    fn build(
        width: u32,
        height: u32,
        seed: u32,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        let surface = Surface { width, height };
        let driver = TickDriver::new(config, surface, u64::from(seed)).inspect_err(|err| {
            console_warn!("rejected sandfall config: {err}");
        })?;
        let grid = driver.grid();
        console_log!(
            "universe {}x{} cells ({}px pitch) on a {width}x{height} surface",
            grid.cols(),
            grid.rows(),
            driver.config().cell_pitch,
        );
        let redraw = RedrawBuffer::new(grid.cols());
        Ok(Self { driver, redraw })
    }

    #[must_use]
    pub fn driver(&self) -> &TickDriver {
        &self.driver
    }

    #[must_use]
    pub fn redraw(&self) -> &RedrawBuffer {
        &self.redraw
    }
}

#[wasm_bindgen]
impl Universe {
    /// Universe with the default config, sized to a `width × height` px surface.
    ///
    /// # Errors
    ///
    /// Fails when the surface is smaller than one cell.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, seed: u32) -> Result<Universe, JsError> {
        Ok(Self::build(width, height, seed, SimulationConfig::default())?)
    }

    /// Universe configured from a camelCase JSON object.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, out-of-range values, or a surface smaller
    /// than one cell.
    pub fn with_config(
        width: u32,
        height: u32,
        seed: u32,
        config_json: &str,
    ) -> Result<Universe, JsError> {
        let config = SimulationConfig::from_json(config_json).inspect_err(|err| {
            console_warn!("rejected sandfall config: {err}");
        })?;
        Ok(Self::build(width, height, seed, config)?)
    }

    /// Run one frame. Returns the number of cells to redraw.
    pub fn tick(&mut self) -> u32 {
        self.redraw.clear();
        self.driver.tick(&mut self.redraw);
        self.redraw.indices.len() as u32
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.driver.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.driver.pointer_move(x, y);
    }

    pub fn pointer_up(&mut self) {
        self.driver.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.driver.pointer_leave();
    }

    pub fn clear(&mut self) {
        self.driver.clear();
    }

    pub fn request_full_redraw(&mut self) {
        self.driver.request_full_redraw();
    }

    #[must_use]
    pub fn changed_ptr(&self) -> *const u32 {
        self.redraw.indices.as_ptr()
    }

    #[must_use]
    pub fn changed_len(&self) -> usize {
        self.redraw.indices.len()
    }

    #[must_use]
    pub fn colors_ptr(&self) -> *const u32 {
        self.redraw.colors.as_ptr()
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.driver.grid().rows()
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.driver.grid().cols()
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn cell_pitch(&self) -> u32 {
        self.driver.config().cell_pitch
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.driver.particle_count()
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.driver.ticks()
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn hue(&self) -> f32 {
        self.driver.hue()
    }

    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn dragging(&self) -> bool {
        self.driver.drag_state() == DragState::Dragging
    }
}
