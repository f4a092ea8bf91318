use crossterm::style::Color;

use crate::config::CANVAS_HEIGHT;
use crate::graphics::{shade, Cell, Frame, Rect};
use crate::panel::WeaponSystem;
use crate::state::{format_time, Banner, OptionGroup, SpectralProfile, TargetSelect};
use crate::tooltip::TooltipRegion;

const AMBER: (u8, u8, u8) = (0xaa, 0xaa, 0x00);
const PANEL_MIN_WIDTH: u16 = 34;

/// Screen regions for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Layout {
    /// The animated viewscreen (perspective grid lives here).
    pub viewscreen: Rect,
    /// CRT mask band across the top of the viewscreen.
    pub overlay_band: Rect,
    /// Spectral scan band inside the viewscreen.
    pub scan_band: Rect,
    /// Control panel column.
    pub panel: Rect,
    /// Overlay band height converted to virtual canvas units, handed to the
    /// grid renderer so lines vanish behind the mask.
    pub overlay_height_virtual: f64,
}

impl Layout {
    pub fn compute(width: u16, height: u16) -> Layout {
        let panel_width = PANEL_MIN_WIDTH.min(width / 2);
        let screen_width = width.saturating_sub(panel_width);
        let viewscreen = Rect::new(0, 0, screen_width, height);
        let overlay_rows = (height / 5).max(2).min(height);
        let overlay_band = Rect::new(0, 0, screen_width, overlay_rows);
        let scan_rows = (height / 6).max(1);
        let scan_y = overlay_rows + (height.saturating_sub(overlay_rows)) / 3;
        let scan_band = Rect::new(
            0,
            scan_y.min(height.saturating_sub(scan_rows)),
            screen_width,
            scan_rows,
        );
        let panel = Rect::new(screen_width, 0, panel_width, height);
        let overlay_height_virtual = if height == 0 {
            0.0
        } else {
            overlay_rows as f64 / height as f64 * CANVAS_HEIGHT
        };
        Layout {
            viewscreen,
            overlay_band,
            scan_band,
            panel,
            overlay_height_virtual,
        }
    }
}

/// Keyboard focus across the option groups.
#[derive(Clone, Copy, Debug)]
pub struct Focus {
    pub group: usize,
    pub option: usize,
}

impl Default for Focus {
    fn default() -> Self {
        Focus { group: 0, option: 0 }
    }
}

impl Focus {
    pub fn group(&self) -> OptionGroup {
        OptionGroup::ALL[self.group]
    }

    /// Cyclic movement within the focused group.
    pub fn move_option(&mut self, delta: i32) {
        let len = self.group().len() as i32;
        self.option = ((self.option as i32 + delta + len) % len) as usize;
    }

    /// Moves focus to the next or previous group, clamping the option index.
    pub fn move_group(&mut self, delta: i32) {
        let len = OptionGroup::ALL.len() as i32;
        self.group = ((self.group as i32 + delta + len) % len) as usize;
        self.option = self.option.min(self.group().len() - 1);
    }
}

/// An activatable screen region.
#[derive(Clone, Debug)]
pub struct HitBox {
    pub rect: Rect,
    pub group: OptionGroup,
    pub index: usize,
}

/// Per-frame view output: what the pointer can interact with.
#[derive(Default)]
pub struct ViewArtifacts {
    pub hit_boxes: Vec<HitBox>,
    pub tooltip_regions: Vec<TooltipRegion>,
}

fn hover_hint(group: OptionGroup, index: usize) -> String {
    format!("{}: {}", group.title(), group.label(index))
}

/// Scan band tint for the selected spectral profile; INERT hides the band.
pub fn scan_tint(target: TargetSelect, spectral: SpectralProfile) -> Option<(u8, u8, u8)> {
    if spectral == SpectralProfile::Inert {
        return None;
    }
    Some(match target {
        TargetSelect::InfraRed => (0xff, 0x00, 0x00),
        TargetSelect::Uv => (0x8a, 0x2b, 0xe2),
        TargetSelect::MultiSpec => (0xff, 0xff, 0x00),
    })
}

/// Blink phase derived from the wall clock, 500 ms on / 500 ms off.
pub fn blink_on(now_millis: u128) -> bool {
    (now_millis / 500) % 2 == 0
}

/// Draws the control panel column and returns the interactive regions.
pub fn draw_panel(
    frame: &mut Frame,
    layout: &Layout,
    system: &WeaponSystem,
    focus: &Focus,
    now_millis: u128,
) -> ViewArtifacts {
    let mut artifacts = ViewArtifacts::default();
    let panel = layout.panel;
    if panel.is_empty() {
        return artifacts;
    }
    let amber = shade(AMBER, 1.0);
    let dim = shade(AMBER, 0.45);
    let mut row = panel.y;

    frame.print(panel.x + 1, row, "JEDI WEAPONS CONTROL", amber, Color::Reset);
    row += 2;

    // Option groups, one per block.
    for (group_index, group) in OptionGroup::ALL.into_iter().enumerate() {
        if row + 2 > panel.bottom() {
            break;
        }
        frame.print(panel.x + 1, row, group.title(), dim, Color::Reset);
        row += 1;
        let selected = system.selections.selected_index(group);
        let mut x = panel.x + 1;
        for index in 0..group.len() {
            let label = group.label(index);
            let width = label.chars().count() as u16 + 2;
            if x + width > panel.right() {
                // Flow onto the next row rather than dropping the option.
                row += 1;
                x = panel.x + 1;
                if row >= panel.bottom() {
                    break;
                }
            }
            let focused = focus.group == group_index && focus.option == index;
            let (fg, bg) = if index == selected {
                (Color::Black, amber)
            } else {
                (dim, Color::Reset)
            };
            let (open, close) = if focused { ('>', '<') } else { (' ', ' ') };
            frame.set(x, row, Cell { ch: open, fg: amber, bg: Color::Reset });
            frame.print(x + 1, row, label, fg, bg);
            frame.set(x + width - 1, row, Cell { ch: close, fg: amber, bg: Color::Reset });
            let rect = Rect::new(x, row, width, 1);
            artifacts.hit_boxes.push(HitBox { rect, group, index });
            artifacts
                .tooltip_regions
                .push(TooltipRegion::new(rect, hover_hint(group, index)));
            x += width + 1;
        }
        row += 2;
    }

    // Readouts blink during the self-test.
    let readouts = &system.state.readouts;
    let visible = !readouts.blinking || blink_on(now_millis);
    if row + 1 < panel.bottom() {
        if visible {
            frame.print(
                panel.x + 1,
                row,
                &format!("ROUNDS {:>5}", readouts.rounds),
                amber,
                Color::Reset,
            );
            frame.print(
                panel.x + 14,
                row,
                &format!("TIME {}", format_time(readouts.time)),
                amber,
                Color::Reset,
            );
        }
        row += 2;
    }

    draw_gauges(frame, panel, row, system);
    draw_banner(frame, panel, system.state.banner, now_millis);
    artifacts
}

/// Vertical temperature and RXM gauges, filled from the bottom.
fn draw_gauges(frame: &mut Frame, panel: Rect, top: u16, system: &WeaponSystem) {
    let bottom = panel.bottom().saturating_sub(2);
    if bottom <= top + 1 {
        return;
    }
    let rows = bottom - top - 1;
    let gauges = [
        ("TMP", system.state.temp_level, panel.x + 2),
        ("RXM", system.state.rxm_level, panel.x + 10),
    ];
    for (label, level, x) in gauges {
        let filled = (level / 100.0 * rows as f64).round() as u16;
        for i in 0..rows {
            let y = bottom - 1 - i;
            let (ch, intensity) = if i < filled { ('█', 1.0) } else { ('░', 0.25) };
            for dx in 0..3 {
                frame.set(
                    x + dx,
                    y,
                    Cell {
                        ch,
                        fg: shade(AMBER, intensity),
                        bg: Color::Reset,
                    },
                );
            }
        }
        frame.print(x, bottom, label, shade(AMBER, 0.45), Color::Reset);
    }
}

/// Critical-warning banner, centered over the viewscreen.
fn draw_banner(frame: &mut Frame, panel: Rect, banner: Banner, now_millis: u128) {
    let (text, fg, bg, blinking) = match banner {
        Banner::Hidden => return,
        Banner::Critical => ("CRITICAL", Color::White, Color::Rgb { r: 0xaa, g: 0, b: 0 }, true),
        Banner::Testing => ("TESTING", Color::White, Color::Rgb { r: 0xaa, g: 0, b: 0 }, true),
        Banner::Complete => ("COMPLETE", Color::Black, shade(AMBER, 1.0), false),
    };
    if blinking && !blink_on(now_millis) {
        return;
    }
    let width = text.chars().count() as u16 + 2;
    let x = panel.x.saturating_sub(width + 2);
    let y = 1;
    frame.set(x, y, Cell { ch: ' ', fg, bg });
    frame.print(x + 1, y, text, fg, bg);
    frame.set(x + width - 1, y, Cell { ch: ' ', fg, bg });
}

/// Tints the scan band; the band disappears entirely on INERT.
pub fn draw_scan_band(frame: &mut Frame, layout: &Layout, system: &WeaponSystem) {
    let Some(tint) = scan_tint(
        system.selections.target_select,
        system.selections.spectral,
    ) else {
        return;
    };
    let fg = shade(tint, 0.3);
    let band = layout.scan_band;
    for y in band.y..band.bottom() {
        for x in band.x..band.right() {
            if let Some(cell) = frame.cell(x, y) {
                if cell.ch == ' ' {
                    frame.set(x, y, Cell { ch: '▒', fg, bg: Color::Reset });
                }
            }
        }
    }
}

/// Debug HUD: crate name, version, and frame rate in the corner.
pub fn draw_debug_hud(frame: &mut Frame, fps: f64) {
    frame.print(
        1,
        0,
        &format!("{} {}  FPS: {:.1}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), fps),
        Color::White,
        Color::Reset,
    );
}
