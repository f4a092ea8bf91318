use crossterm::style::Color;

/// A single character cell in the frame buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::Reset,
        bg: Color::Reset,
    };
}

/// Rectangular region in cell coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rect { x, y, width, height }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn right(&self) -> u16 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u16 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Scales an RGB color by an intensity in [0, 1].
pub fn shade(rgb: (u8, u8, u8), intensity: f64) -> Color {
    let level = intensity.clamp(0.0, 1.0);
    Color::Rgb {
        r: (rgb.0 as f64 * level).min(255.0) as u8,
        g: (rgb.1 as f64 * level).min(255.0) as u8,
        b: (rgb.2 as f64 * level).min(255.0) as u8,
    }
}

/// Off-screen frame of cells. Renderers draw into this; the terminal
/// backend diffs it against the previously presented frame.
#[derive(Clone)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Frame {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(&self.cells[y as usize * self.width as usize + x as usize])
    }

    /// Writes a cell, silently clipping anything outside the frame.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    /// Writes a string starting at (x, y), clipped to the frame edge.
    pub fn print(&mut self, x: u16, y: u16, text: &str, fg: Color, bg: Color) {
        for (i, ch) in text.chars().enumerate() {
            let cx = x.saturating_add(i as u16);
            self.set(cx, y, Cell { ch, fg, bg });
        }
    }
}

/// Maps the virtual canvas coordinate space onto a cell viewport and
/// strokes lines into the frame, the terminal stand-in for a 2D canvas
/// context with `globalAlpha`.
pub struct Canvas<'a> {
    frame: &'a mut Frame,
    viewport: Rect,
    canvas_width: f64,
    canvas_height: f64,
    base_color: (u8, u8, u8),
}

impl<'a> Canvas<'a> {
    pub fn new(
        frame: &'a mut Frame,
        viewport: Rect,
        canvas_width: f64,
        canvas_height: f64,
        base_color: (u8, u8, u8),
    ) -> Self {
        Canvas {
            frame,
            viewport,
            canvas_width,
            canvas_height,
            base_color,
        }
    }

    fn to_cell(&self, x: f64, y: f64) -> (i32, i32) {
        let cx = self.viewport.x as f64 + x / self.canvas_width * self.viewport.width as f64;
        let cy = self.viewport.y as f64 + y / self.canvas_height * self.viewport.height as f64;
        (cx.floor() as i32, cy.floor() as i32)
    }

    fn plot(&mut self, x: i32, y: i32, ch: char, intensity: f64) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u16, y as u16);
        if !self.viewport.contains(x, y) {
            return;
        }
        self.frame.set(
            x,
            y,
            Cell {
                ch,
                fg: shade(self.base_color, intensity),
                bg: Color::Reset,
            },
        );
    }

    /// Strokes a horizontal line between two virtual x-coordinates. Stroke
    /// widths beyond the base line weight pick a heavier glyph.
    pub fn stroke_horizontal(&mut self, x0: f64, x1: f64, y: f64, intensity: f64, width: f64) {
        let (cx0, cy) = self.to_cell(x0.min(x1), y);
        let (cx1, _) = self.to_cell(x0.max(x1), y);
        let ch = if width > 2.5 { '═' } else { '─' };
        for x in cx0..=cx1 {
            self.plot(x, cy, ch, intensity);
        }
    }

    /// Strokes an arbitrary line segment between two virtual points,
    /// stepping one cell at a time along the longer axis.
    pub fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, intensity: f64, width: f64) {
        let (cx0, cy0) = self.to_cell(x0, y0);
        let (cx1, cy1) = self.to_cell(x1, y1);
        let dx = cx1 - cx0;
        let dy = cy1 - cy0;
        let steps = dx.abs().max(dy.abs());
        let heavy = width > 2.5;
        let ch = if dx == 0 {
            if heavy {
                '║'
            } else {
                '│'
            }
        } else if dy == 0 {
            if heavy {
                '═'
            } else {
                '─'
            }
        } else if (dx > 0) == (dy > 0) {
            '\\'
        } else {
            '/'
        };
        if steps == 0 {
            self.plot(cx0, cy0, ch, intensity);
            return;
        }
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = cx0 as f64 + dx as f64 * t;
            let y = cy0 as f64 + dy as f64 * t;
            self.plot(x.round() as i32, y.round() as i32, ch, intensity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clips_out_of_bounds() {
        let mut frame = Frame::new(4, 3);
        frame.set(10, 10, Cell { ch: 'x', fg: Color::White, bg: Color::Reset });
        assert!(frame.cells.iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn print_writes_and_clips() {
        let mut frame = Frame::new(4, 1);
        frame.print(2, 0, "abcd", Color::White, Color::Reset);
        assert_eq!(frame.cell(2, 0).unwrap().ch, 'a');
        assert_eq!(frame.cell(3, 0).unwrap().ch, 'b');
        assert_eq!(frame.cell(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn horizontal_stroke_maps_virtual_coordinates() {
        let mut frame = Frame::new(10, 10);
        let viewport = frame.area();
        let mut canvas = Canvas::new(&mut frame, viewport, 100.0, 100.0, (255, 255, 0));
        canvas.stroke_horizontal(0.0, 99.0, 50.0, 1.0, 1.0);
        for x in 0..10 {
            assert_eq!(frame.cell(x, 5).unwrap().ch, '─');
        }
        assert_eq!(frame.cell(0, 4).unwrap().ch, ' ');
    }

    #[test]
    fn stroke_outside_viewport_is_dropped() {
        let mut frame = Frame::new(10, 10);
        let viewport = Rect::new(0, 0, 5, 5);
        let mut canvas = Canvas::new(&mut frame, viewport, 100.0, 100.0, (255, 255, 0));
        canvas.stroke_line(0.0, 0.0, 99.0, 99.0, 1.0, 1.0);
        for y in 0..10u16 {
            for x in 0..10u16 {
                if x >= 5 || y >= 5 {
                    assert_eq!(*frame.cell(x, y).unwrap(), Cell::BLANK);
                }
            }
        }
    }

    #[test]
    fn shade_scales_channels() {
        match shade((200, 100, 0), 0.5) {
            Color::Rgb { r, g, b } => {
                assert_eq!((r, g, b), (100, 50, 0));
            }
            other => panic!("expected rgb, got {other:?}"),
        }
    }
}
