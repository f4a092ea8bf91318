/// Virtual canvas size used for all projection math. Rasterization maps
/// these coordinates onto whatever cell viewport the terminal provides.
pub const CANVAS_WIDTH: f64 = 1024.0;
pub const CANVAS_HEIGHT: f64 = 800.0;

/// Configuration for the perspective grid renderer, fixed at construction.
#[derive(Clone, Debug)]
pub struct GridConfig {
    /// Cell depth size
    pub cell_size_z: f64,
    /// Cell width size
    pub cell_size_x: f64,
    /// Horizontal cells count
    pub grid_width: f64,
    /// Depth cells count
    pub grid_depth: u32,
    /// Movement speed per frame
    pub speed: f64,
    /// Line thickness
    pub line_width: f64,
    /// Horizon position (0-1)
    pub horizon: f64,
    /// Overlay height fallback
    pub overlay_height: f64,
    /// Anisotropic blur factor
    pub anisotropic_blur: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            cell_size_z: 1000.0,
            cell_size_x: 1000.0,
            grid_width: 200.0,
            grid_depth: 200,
            speed: 3.0,
            line_width: 2.0,
            horizon: 0.38,
            overlay_height: 100.0,
            anisotropic_blur: 0.01,
        }
    }
}

pub const PERSPECTIVE_FACTOR: f64 = 0.0005;
pub const VERTICAL_LINE_SCALE_FACTOR: f64 = 4.0;
pub const VERTICAL_LINE_DENSITY_FACTOR: f64 = 4.0;
pub const ALPHA_FALLOFF_OFFSET: f64 = 0.2;

/// Configuration for the CRT scanline overlay renderer.
#[derive(Clone, Debug)]
pub struct OverlayConfig {
    /// Spacing between scan lines, in cells
    pub grid_spacing: u16,
    /// Stroke intensity of ordinary lines (0-1)
    pub line_intensity: f64,
    /// Heavier line every N ordinary lines; 0 or 1 disables accents
    pub accent_line_every: u16,
    /// Stroke intensity of accent lines (0-1)
    pub accent_intensity: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            grid_spacing: 3,
            line_intensity: 0.15,
            accent_line_every: 0,
            accent_intensity: 0.35,
        }
    }
}

/// Weapon-panel defaults and timing constants.
pub const DEFAULT_ROUNDS: u32 = 500;
pub const DEFAULT_TIME: f64 = 33.33;
pub const DEFAULT_TEMP_LEVEL: f64 = 30.0;
pub const DEFAULT_RXM_LEVEL: f64 = 0.0;
pub const LOW_AMMO_THRESHOLD: u32 = 100;

pub const GAUGE_UPDATE_INTERVAL_MS: u64 = 500;
pub const TEST_STEP_INTERVAL_MS: u64 = 150;
pub const TEST_SEQUENCE_DURATION_MS: u64 = 3000;
pub const TEST_COMPLETE_DISPLAY_MS: u64 = 1000;

/// Temperature jumps to this level the moment firing starts.
pub const FIRING_TEMP_LEVEL: f64 = 60.0;
/// Temperature ceiling while firing.
pub const MAX_FIRING_TEMP: f64 = 90.0;
/// Temperature gained per shot.
pub const TEMP_PER_SHOT: f64 = 0.5;
/// RXM gauge gained per shot.
pub const RXM_PER_SHOT: f64 = 1.0;
/// Cooldown decay per tick.
pub const COOLDOWN_TEMP_STEP: f64 = 5.0;
pub const COOLDOWN_RXM_STEP: f64 = 10.0;
