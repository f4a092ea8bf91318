use tracing::warn;

use crate::config::{
    GridConfig, CANVAS_HEIGHT, CANVAS_WIDTH, VERTICAL_LINE_DENSITY_FACTOR,
    VERTICAL_LINE_SCALE_FACTOR,
};
use crate::graphics::{Canvas, Frame, Rect};
use crate::math;

/// Grid base color, amber like the rest of the console.
const GRID_COLOR: (u8, u8, u8) = (0xaa, 0xaa, 0x00);

/// Draws a ground-plane grid receding toward a horizon point, scrolling
/// toward the viewer. All projection math happens in the fixed virtual
/// canvas space; the `Canvas` maps it onto whatever cells are available.
pub struct GridRenderer {
    config: GridConfig,
    vanishing_x: f64,
    vanishing_y: f64,
    depth_limit: f64,
    grid_position: f64,
    running: bool,
    warned_empty: bool,
}

impl GridRenderer {
    pub fn new(config: GridConfig) -> Self {
        let vanishing_x = CANVAS_WIDTH / 2.0;
        let vanishing_y = CANVAS_HEIGHT * config.horizon;
        let depth_limit = config.grid_depth as f64 * config.cell_size_z;
        GridRenderer {
            config,
            vanishing_x,
            vanishing_y,
            depth_limit,
            grid_position: 0.0,
            running: true,
            warned_empty: false,
        }
    }

    pub fn grid_position(&self) -> f64 {
        self.grid_position
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Resumes the animation; idempotent.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Suspends the animation without resetting the camera; idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advances the camera one frame, wrapping within one cell depth so the
    /// scroll repeats seamlessly.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }
        self.grid_position = (self.grid_position + self.config.speed) % self.config.cell_size_z;
    }

    /// Draws the grid into the viewport. `overlay_height` is the top of the
    /// visible band in virtual canvas units; lines projected above it are
    /// hidden behind the overlay.
    pub fn draw(&mut self, frame: &mut Frame, viewport: Rect, overlay_height: f64) {
        if viewport.is_empty() {
            if !self.warned_empty {
                warn!("grid surface is missing; animation cannot start");
                self.warned_empty = true;
            }
            return;
        }
        let mut canvas = Canvas::new(frame, viewport, CANVAS_WIDTH, CANVAS_HEIGHT, GRID_COLOR);
        let half_grid_width = self.config.grid_width / 2.0;
        self.draw_horizontal_lines(&mut canvas, overlay_height);
        self.draw_vertical_lines(&mut canvas, overlay_height, half_grid_width);
    }

    /// Horizontal depth lines, near to far.
    fn draw_horizontal_lines(&self, canvas: &mut Canvas<'_>, overlay_height: f64) {
        for z in 0..self.config.grid_depth {
            let depth = z as f64 * self.config.cell_size_z - self.grid_position;
            if depth < 0.0 {
                continue;
            }
            let scale = math::perspective_scale(depth);
            let y = math::perspective_y(self.vanishing_y, CANVAS_HEIGHT, scale);
            let scaled_width = self.config.grid_width * self.config.cell_size_x * scale;

            if y <= CANVAS_HEIGHT && y >= overlay_height {
                let width_factor =
                    math::anisotropic_factor(self.config.anisotropic_blur, depth, 0.01);
                canvas.stroke_horizontal(
                    self.vanishing_x - scaled_width / 2.0,
                    self.vanishing_x + scaled_width / 2.0,
                    y,
                    math::depth_opacity(depth, self.depth_limit),
                    self.config.line_width * width_factor,
                );
            }
        }
    }

    /// Vertical lines projected from the vanishing point down to the near
    /// edge, thinned beyond the density limit.
    fn draw_vertical_lines(&self, canvas: &mut Canvas<'_>, overlay_height: f64, half_width: f64) {
        let density_limit = self.config.grid_width / VERTICAL_LINE_DENSITY_FACTOR;
        let half = half_width as i32;
        for x in -half..=half {
            let distance = (x as f64).abs();
            if distance > density_limit {
                continue;
            }
            let near_x =
                self.vanishing_x + x as f64 * self.config.cell_size_x / VERTICAL_LINE_SCALE_FACTOR;
            let near_y = CANVAS_HEIGHT;
            let ratio = (overlay_height - self.vanishing_y) / (near_y - self.vanishing_y);
            let intersect_x = self.vanishing_x + (near_x - self.vanishing_x) * ratio;
            let width_factor =
                math::anisotropic_factor(self.config.anisotropic_blur, distance, 0.1);

            canvas.stroke_line(
                intersect_x,
                overlay_height,
                near_x,
                near_y,
                math::lateral_opacity(distance, half_width),
                self.config.line_width * width_factor,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> GridRenderer {
        GridRenderer::new(GridConfig::default())
    }

    #[test]
    fn position_wraps_within_cell_depth() {
        let mut grid = renderer();
        let cell_depth = 1000.0;
        for _ in 0..100_000 {
            grid.step();
            assert!(grid.grid_position() >= 0.0);
            assert!(grid.grid_position() < cell_depth);
        }
    }

    #[test]
    fn stopped_renderer_does_not_advance() {
        let mut grid = renderer();
        grid.step();
        let position = grid.grid_position();
        grid.stop();
        grid.step();
        assert_eq!(grid.grid_position(), position);
        grid.start();
        grid.step();
        assert!(grid.grid_position() > position);
    }

    #[test]
    fn draw_produces_grid_cells() {
        let mut grid = renderer();
        let mut frame = Frame::new(80, 40);
        grid.step();
        grid.draw(&mut frame, Rect::new(0, 0, 80, 40), 100.0);
        let mut strokes = 0;
        for y in 0..40 {
            for x in 0..80 {
                if frame.cell(x, y).unwrap().ch != ' ' {
                    strokes += 1;
                }
            }
        }
        assert!(strokes > 40, "expected a visible grid, found {strokes} cells");
    }

    #[test]
    fn empty_viewport_degrades_silently() {
        let mut grid = renderer();
        let mut frame = Frame::new(10, 10);
        grid.draw(&mut frame, Rect::new(0, 0, 0, 0), 100.0);
        grid.draw(&mut frame, Rect::new(0, 0, 0, 0), 100.0);
        assert!(frame.cell(0, 0).unwrap().ch == ' ');
    }
}
