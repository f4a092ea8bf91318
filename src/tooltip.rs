use crossterm::style::Color;

use crate::graphics::{Cell, Frame, Rect};

/// Cursor offset before edge correction.
const OFFSET_X: u16 = 2;
const OFFSET_Y: u16 = 1;

/// A screen region annotated with hover text. The UI publishes a fresh set
/// every frame, so regions can come and go without any re-registration.
#[derive(Clone, Debug)]
pub struct TooltipRegion {
    pub rect: Rect,
    pub text: String,
}

impl TooltipRegion {
    pub fn new(rect: Rect, text: impl Into<String>) -> Self {
        TooltipRegion {
            rect,
            text: text.into(),
        }
    }
}

/// The single shared tooltip. Follows the pointer while active, flipping to
/// the far side of the cursor when it would overflow the right edge and
/// clamping above the bottom edge.
#[derive(Default)]
pub struct Tooltip {
    active: bool,
    text: String,
    position: (u16, u16),
}

impl Tooltip {
    pub fn new() -> Self {
        Tooltip::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> (u16, u16) {
        self.position
    }

    /// Handles pointer movement: hovering an annotated region activates the
    /// tooltip with that region's text, leaving it deactivates, and any
    /// movement while active repositions the bubble near the cursor.
    pub fn on_pointer_move(
        &mut self,
        x: u16,
        y: u16,
        regions: &[TooltipRegion],
        screen_width: u16,
        screen_height: u16,
    ) {
        match regions.iter().find(|region| region.rect.contains(x, y)) {
            Some(region) => {
                self.text = region.text.clone();
                self.active = true;
            }
            None => {
                self.active = false;
            }
        }
        if self.active {
            self.position = self.place(x, y, screen_width, screen_height);
        }
    }

    fn width(&self) -> u16 {
        self.text.chars().count() as u16 + 2
    }

    fn place(&self, x: u16, y: u16, screen_width: u16, screen_height: u16) -> (u16, u16) {
        let width = self.width();
        let mut final_x = x.saturating_add(OFFSET_X);
        if final_x + width > screen_width {
            // Flip to the left side of the cursor.
            final_x = x.saturating_sub(width + OFFSET_X);
        }
        let mut final_y = y.saturating_add(OFFSET_Y);
        if final_y + 1 > screen_height {
            final_y = screen_height.saturating_sub(1);
        }
        (final_x, final_y)
    }

    pub fn draw(&self, frame: &mut Frame) {
        if !self.active {
            return;
        }
        let (x, y) = self.position;
        let fg = Color::Black;
        let bg = Color::Rgb {
            r: 0xaa,
            g: 0xaa,
            b: 0x00,
        };
        frame.set(x, y, Cell { ch: ' ', fg, bg });
        frame.print(x + 1, y, &self.text, fg, bg);
        frame.set(x + self.width() - 1, y, Cell { ch: ' ', fg, bg });
    }
}
