//! Venn Drop - falling-particle estimator for set-intersection probabilities
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, classification, scheduling)
//! - `probability`: Boundary to the upstream probability model
//! - `render`: Per-frame snapshot handed to the drawing layer
//! - `settings`: Data-driven simulation configuration
//! - `error`: Errors for the fallible edges (settings files, CLI)

pub mod error;
pub mod probability;
pub mod render;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use error::{Result, VennDropError};
pub use probability::{ProbabilityInputs, ProbabilitySource};
pub use render::FrameSnapshot;
pub use settings::Settings;
pub use sim::{SimPhase, Simulation, TickInput, tick};

/// Simulation configuration constants
pub mod consts {
    /// Default canvas dimensions (pixels)
    pub const CANVAS_WIDTH: f32 = 600.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;
    /// Horizontal band particles spawn in; regions are laid out inside it
    pub const SPAWN_WIDTH: f32 = 500.0;

    /// Regions never collapse below this width, even at probability 0
    pub const MIN_REGION_WIDTH: f32 = 20.0;
    /// Top edge of both region bands
    pub const REGION_Y: f32 = 180.0;
    pub const REGION_HEIGHT: f32 = 20.0;
    /// Shortest accepted canvas: the floor must sit clearly below both bands
    pub const MIN_CANVAS_HEIGHT: f32 = REGION_Y + REGION_HEIGHT + 40.0;

    /// Particle defaults
    pub const PARTICLE_RADIUS: f32 = 4.0;
    /// Spawn height (above the visible canvas)
    pub const SPAWN_Y: f32 = -10.0;
    /// Initial downward speed is drawn from [0, INITIAL_VY_MAX)
    pub const INITIAL_VY_MAX: f32 = 1.0;

    /// Downward acceleration (pixels/frame²)
    pub const GRAVITY: f32 = 0.2;
    /// Fraction of vertical speed kept after a bounce
    pub const RESTITUTION: f32 = 0.5;
    /// Floor bounces allowed before a particle retires
    pub const MAX_BOUNCES: u32 = 3;
    /// Below this vertical speed a particle no longer bounces
    pub const MIN_BOUNCE_SPEED: f32 = 0.5;
    /// Particles this far below the floor are retired unconditionally
    pub const OFFSCREEN_MARGIN: f32 = 100.0;
    /// Hard cap on a particle's lifetime (frames)
    pub const MAX_LIFETIME_TICKS: u32 = 2_000;

    /// Spawn rate (per-frame drop probability) limits
    pub const MIN_SPAWN_RATE: f32 = 0.05;
    pub const MAX_SPAWN_RATE: f32 = 0.5;
    pub const DEFAULT_SPAWN_RATE: f32 = 0.2;

    /// Speed multiplier limits
    pub const MIN_SPEED_MULTIPLIER: f32 = 0.25;
    pub const MAX_SPEED_MULTIPLIER: f32 = 2.0;

    /// Live particle cap (spawning pauses while reached)
    pub const MAX_LIVE_PARTICLES: usize = 500;
}

/// Clamp a possibly-malformed probability into [0, 1]; non-finite becomes 0
#[inline]
pub fn sanitize_probability(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
