mod audio;
mod config;
mod graphics;
mod grid;
mod math;
mod overlay;
mod panel;
mod sched;
mod state;
mod terminal;
mod tooltip;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::audio::AudioManager;
use crate::config::{GridConfig, OverlayConfig};
use crate::graphics::Frame;
use crate::grid::GridRenderer;
use crate::overlay::ScanlineOverlay;
use crate::panel::WeaponSystem;
use crate::terminal::Terminal;
use crate::tooltip::Tooltip;
use crate::ui::{Focus, Layout, ViewArtifacts};

/// A console-based retro weapons-control panel demo.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Target frame rate
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// Grid scroll speed per frame
    #[arg(long, default_value_t = 3.0)]
    speed: f64,
    /// Draw accent scan lines every N ordinary lines (0 disables)
    #[arg(long, default_value_t = 0)]
    accent: u16,
    /// Disable sound cues
    #[arg(long)]
    mute: bool,
}

/// Top-level application state: the renderers, the controller, and the
/// input plumbing between them.
struct App {
    grid: GridRenderer,
    overlays: Vec<ScanlineOverlay>,
    system: WeaponSystem,
    tooltip: Tooltip,
    focus: Focus,
    layout: Layout,
    frame: Frame,
    artifacts: ViewArtifacts,
    started: Instant,
    focused: bool,
    debug: bool,
    quit: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl App {
    fn new(args: &Args, width: u16, height: u16) -> Self {
        let layout = Layout::compute(width, height);
        let grid_config = GridConfig {
            speed: args.speed,
            ..GridConfig::default()
        };
        let overlay_config = OverlayConfig {
            accent_line_every: args.accent,
            ..OverlayConfig::default()
        };
        let audio = if args.mute {
            AudioManager::muted()
        } else {
            AudioManager::new()
        };
        App {
            grid: GridRenderer::new(grid_config),
            overlays: ScanlineOverlay::for_each(&overlay_config, &[layout.overlay_band]),
            system: WeaponSystem::new(audio),
            tooltip: Tooltip::new(),
            focus: Focus::default(),
            layout,
            frame: Frame::new(width, height),
            artifacts: ViewArtifacts::default(),
            started: Instant::now(),
            focused: true,
            debug: false,
            quit: false,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('d') | KeyCode::Char('D') => self.debug = !self.debug,
            KeyCode::Right | KeyCode::Down => self.focus.move_option(1),
            KeyCode::Left | KeyCode::Up => self.focus.move_option(-1),
            KeyCode::Tab => self.focus.move_group(1),
            KeyCode::BackTab => self.focus.move_group(-1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.system.activate(self.focus.group(), self.focus.option, now);
            }
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.tooltip.on_pointer_move(
                    mouse.column,
                    mouse.row,
                    &self.artifacts.tooltip_regions,
                    self.frame.width(),
                    self.frame.height(),
                );
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let hit = self
                    .artifacts
                    .hit_boxes
                    .iter()
                    .find(|hit| hit.rect.contains(mouse.column, mouse.row))
                    .map(|hit| (hit.group, hit.index));
                if let Some((group, index)) = hit {
                    // Clicking also moves keyboard focus onto the option.
                    if let Some(position) =
                        crate::state::OptionGroup::ALL.iter().position(|g| *g == group)
                    {
                        self.focus.group = position;
                        self.focus.option = index;
                    }
                    self.system.activate(group, index, now);
                }
            }
            _ => {}
        }
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "terminal resized");
        self.layout = Layout::compute(width, height);
        self.frame = Frame::new(width, height);
        for overlay in &mut self.overlays {
            overlay.resize(self.layout.overlay_band);
        }
    }

    /// Terminal focus is the visibility signal: animations suspend entirely
    /// while unfocused and resume without catching up missed frames.
    fn on_focus(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.grid.start();
            for overlay in &mut self.overlays {
                overlay.start();
            }
        } else {
            self.grid.stop();
            for overlay in &mut self.overlays {
                overlay.stop();
            }
        }
    }

    /// Builds one frame: advance the camera, then layer the viewscreen,
    /// scan band, overlay mask, panel, and tooltip.
    fn render(&mut self) {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_calculation);
        if elapsed.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / elapsed.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        self.frame.clear();
        self.grid.step();
        self.grid.draw(
            &mut self.frame,
            self.layout.viewscreen,
            self.layout.overlay_height_virtual,
        );
        ui::draw_scan_band(&mut self.frame, &self.layout, &self.system);
        for overlay in &self.overlays {
            if overlay.is_running() {
                overlay.draw(&mut self.frame);
            }
        }
        self.artifacts = ui::draw_panel(
            &mut self.frame,
            &self.layout,
            &self.system,
            &self.focus,
            self.started.elapsed().as_millis(),
        );
        self.tooltip.draw(&mut self.frame);
        if self.debug {
            ui::draw_debug_hud(&mut self.frame, self.fps);
        }
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut terminal = Terminal::new()?;
    let result = run(&mut terminal, &args);
    drop(terminal);
    result
}

/// The cooperative loop: wait for input no longer than the next timer or
/// frame deadline, apply events, run due timers, and present.
fn run(terminal: &mut Terminal, args: &Args) -> io::Result<()> {
    let (width, height) = Terminal::size();
    let mut app = App::new(args, width, height);
    let frame_interval = Duration::from_millis(1000 / args.fps.clamp(1, 120) as u64);
    let mut next_frame = Instant::now();

    loop {
        let now = Instant::now();
        let mut deadline = next_frame;
        if let Some(timer) = app.system.next_deadline() {
            deadline = deadline.min(timer);
        }
        let timeout = deadline.saturating_duration_since(now);
        if event::poll(timeout)? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => app.on_key(key, now),
                Event::Mouse(mouse) => app.on_mouse(mouse, now),
                Event::Resize(width, height) => app.on_resize(width, height),
                Event::FocusGained => app.on_focus(true),
                Event::FocusLost => app.on_focus(false),
                _ => {}
            }
        }
        if app.quit {
            return Ok(());
        }

        let now = Instant::now();
        app.system.pump(now);
        if now >= next_frame {
            if app.focused {
                app.render();
                terminal.present(&app.frame)?;
            }
            next_frame = now + frame_interval;
        }
    }
}
