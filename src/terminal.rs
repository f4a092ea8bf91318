use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor,
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::debug;

use crate::graphics::Frame;

/// Terminal session guard and frame presenter. Entering raw mode, the
/// alternate screen, and mouse/focus reporting happens on construction;
/// everything is undone on drop, including the error path out of the event
/// loop.
pub struct Terminal {
    out: BufWriter<Stdout>,
    previous: Option<Frame>,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        let mut out = BufWriter::new(io::stdout());
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            cursor::Hide,
            Clear(ClearType::All),
        )?;
        debug!("terminal session started");
        Ok(Terminal {
            out,
            previous: None,
        })
    }

    /// Current cell dimensions, falling back to `termsize` and then a
    /// conventional 80x24 when the terminal will not say.
    pub fn size() -> (u16, u16) {
        if let Ok(size) = terminal::size() {
            return size;
        }
        if let Some(size) = termsize::get() {
            return (size.cols, size.rows);
        }
        (80, 24)
    }

    /// Presents a frame, emitting commands only for cells that changed
    /// since the previous present. All commands are queued and flushed
    /// once, which keeps the redraw flicker-free.
    pub fn present(&mut self, frame: &Frame) -> io::Result<()> {
        let full_redraw = match &self.previous {
            Some(previous) => {
                previous.width() != frame.width() || previous.height() != frame.height()
            }
            None => true,
        };
        if full_redraw {
            queue!(self.out, ResetColor, Clear(ClearType::All))?;
        }

        let mut fg = None;
        let mut bg = None;
        let mut cursor_at = None;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let Some(&cell) = frame.cell(x, y) else {
                    continue;
                };
                if !full_redraw {
                    if let Some(previous) = self.previous.as_ref().and_then(|p| p.cell(x, y)) {
                        if *previous == cell {
                            continue;
                        }
                    }
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.out, cursor::MoveTo(x, y))?;
                }
                if fg != Some(cell.fg) {
                    queue!(self.out, SetForegroundColor(cell.fg))?;
                    fg = Some(cell.fg);
                }
                if bg != Some(cell.bg) {
                    queue!(self.out, SetBackgroundColor(normalize_bg(cell.bg)))?;
                    bg = Some(cell.bg);
                }
                queue!(self.out, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()?;
        self.previous = Some(frame.clone());
        Ok(())
    }
}

/// Every cell gets an explicit background so inter-row gap pixels match on
/// VTE-based terminals.
fn normalize_bg(bg: Color) -> Color {
    match bg {
        Color::Reset => Color::Rgb { r: 8, g: 8, b: 4 },
        other => other,
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            DisableMouseCapture,
            DisableFocusChange,
            cursor::Show,
            LeaveAlternateScreen,
        );
        let _ = terminal::disable_raw_mode();
        debug!("terminal session restored");
    }
}
