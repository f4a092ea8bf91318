use crate::config::OverlayConfig;
use crate::graphics::{shade, Cell, Frame, Rect};

/// Overlay base color, dimmed per-stroke by the intensity settings.
const OVERLAY_COLOR: (u8, u8, u8) = (0xff, 0xff, 0x00);

/// Redraws a fixed-spacing line grid over its viewport every frame, the
/// terminal take on a CRT mask. Visually static, but it follows the same
/// animation-loop lifecycle as the perspective grid so it participates in
/// focus suspend/resume and resize.
pub struct ScanlineOverlay {
    config: OverlayConfig,
    viewport: Rect,
    running: bool,
}

impl ScanlineOverlay {
    pub fn new(config: OverlayConfig, viewport: Rect) -> Self {
        ScanlineOverlay {
            config,
            viewport,
            running: true,
        }
    }

    /// Creates one independent instance per viewport region.
    pub fn for_each(config: &OverlayConfig, viewports: &[Rect]) -> Vec<ScanlineOverlay> {
        viewports
            .iter()
            .map(|viewport| ScanlineOverlay::new(config.clone(), *viewport))
            .collect()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Recomputes the viewport after a terminal resize.
    pub fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn draw(&self, frame: &mut Frame) {
        if self.viewport.is_empty() {
            return;
        }
        let spacing = self.config.grid_spacing.max(1);
        self.stroke_lines(frame, spacing, self.config.line_intensity);
        if self.config.accent_line_every > 1 {
            let accent = spacing * self.config.accent_line_every;
            self.stroke_lines(frame, accent, self.config.accent_intensity);
        }
    }

    fn stroke_lines(&self, frame: &mut Frame, spacing: u16, intensity: f64) {
        let fg = shade(OVERLAY_COLOR, intensity);
        let area = self.viewport;
        let mut x = area.x;
        while x < area.right() {
            for y in area.y..area.bottom() {
                self.merge(frame, x, y, '╎', fg);
            }
            x += spacing;
        }
        let mut y = area.y;
        while y < area.bottom() {
            for x in area.x..area.right() {
                self.merge(frame, x, y, '╌', fg);
            }
            y += spacing;
        }
    }

    /// Draws a scan stroke, joining into a cross where lines intersect.
    fn merge(&self, frame: &mut Frame, x: u16, y: u16, ch: char, fg: crossterm::style::Color) {
        let joined = match frame.cell(x, y).map(|cell| cell.ch) {
            Some('╎') if ch == '╌' => '┼',
            Some('╌') if ch == '╎' => '┼',
            Some('┼') => '┼',
            _ => ch,
        };
        frame.set(
            x,
            y,
            Cell {
                ch: joined,
                fg,
                bg: crossterm::style::Color::Reset,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strokes_at_spacing_intervals() {
        let overlay = ScanlineOverlay::new(
            OverlayConfig {
                grid_spacing: 3,
                ..OverlayConfig::default()
            },
            Rect::new(0, 0, 9, 9),
        );
        let mut frame = Frame::new(9, 9);
        overlay.draw(&mut frame);
        assert_eq!(frame.cell(0, 0).unwrap().ch, '┼');
        assert_eq!(frame.cell(3, 0).unwrap().ch, '┼');
        assert_eq!(frame.cell(3, 1).unwrap().ch, '╎');
        assert_eq!(frame.cell(1, 3).unwrap().ch, '╌');
        assert_eq!(frame.cell(1, 1).unwrap().ch, ' ');
    }

    #[test]
    fn accent_stride_of_one_is_disabled() {
        let config = OverlayConfig {
            grid_spacing: 2,
            accent_line_every: 1,
            line_intensity: 0.15,
            accent_intensity: 0.35,
        };
        let overlay = ScanlineOverlay::new(config, Rect::new(0, 0, 8, 8));
        let mut frame = Frame::new(8, 8);
        overlay.draw(&mut frame);
        let faint = shade(OVERLAY_COLOR, 0.15);
        assert_eq!(frame.cell(0, 1).unwrap().fg, faint);
    }

    #[test]
    fn accent_lines_overwrite_with_brighter_strokes() {
        let config = OverlayConfig {
            grid_spacing: 2,
            accent_line_every: 2,
            line_intensity: 0.15,
            accent_intensity: 0.35,
        };
        let overlay = ScanlineOverlay::new(config, Rect::new(0, 0, 8, 8));
        let mut frame = Frame::new(8, 8);
        overlay.draw(&mut frame);
        let bright = shade(OVERLAY_COLOR, 0.35);
        let faint = shade(OVERLAY_COLOR, 0.15);
        assert_eq!(frame.cell(0, 1).unwrap().fg, bright);
        assert_eq!(frame.cell(2, 1).unwrap().fg, faint);
    }

    #[test]
    fn independent_instances_per_viewport() {
        let overlays = ScanlineOverlay::for_each(
            &OverlayConfig::default(),
            &[Rect::new(0, 0, 4, 4), Rect::new(10, 0, 4, 4)],
        );
        assert_eq!(overlays.len(), 2);
        assert!(overlays.iter().all(ScanlineOverlay::is_running));
    }
}
