//! Simulation settings
//!
//! Loaded from a JSON file on native builds, or passed in as a JSON string
//! by the browser host. Every field is clamped on load; out-of-range values
//! are never an error.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// Simulation settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Canvas ===
    /// Canvas width (pixels)
    pub canvas_width: f32,
    /// Canvas height (pixels); the floor sits at the bottom edge
    pub canvas_height: f32,
    /// Width of the band particles are dropped from, centred on the canvas
    pub spawn_width: f32,

    // === Particles ===
    /// Particle radius (pixels)
    pub particle_radius: f32,
    /// Per-frame probability of a drop (clamped to [0.05, 0.5])
    pub spawn_rate: f32,
    /// Simulation speed (clamped to [0.25, 2.0])
    pub speed_multiplier: f32,
    /// Spawning pauses while this many particles are live
    pub max_live_particles: usize,

    // === Determinism ===
    /// RNG seed
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            spawn_width: SPAWN_WIDTH,

            particle_radius: PARTICLE_RADIUS,
            spawn_rate: DEFAULT_SPAWN_RATE,
            speed_multiplier: 1.0,
            max_live_particles: MAX_LIVE_PARTICLES,

            seed: 0x5EED_BA7E,
        }
    }
}

impl Settings {
    /// Left edge of the spawn band
    pub fn spawn_left(&self) -> f32 {
        (self.canvas_width - self.spawn_width) / 2.0
    }

    pub fn clamp_spawn_rate(rate: f32) -> f32 {
        if rate.is_finite() {
            rate.clamp(MIN_SPAWN_RATE, MAX_SPAWN_RATE)
        } else {
            DEFAULT_SPAWN_RATE
        }
    }

    pub fn clamp_speed_multiplier(multiplier: f32) -> f32 {
        if multiplier.is_finite() {
            multiplier.clamp(MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER)
        } else {
            1.0
        }
    }

    /// Copy with every field forced into its supported range
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let positive_or = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };

        let canvas_width = positive_or(self.canvas_width, defaults.canvas_width);
        // A floor above the region bands would classify every particle as "neither"
        let canvas_height =
            positive_or(self.canvas_height, defaults.canvas_height).max(MIN_CANVAS_HEIGHT);
        // The spawn band has to fit on the canvas and leave room for two minimum-width regions
        let spawn_width = positive_or(self.spawn_width, defaults.spawn_width)
            .clamp(2.0 * MIN_REGION_WIDTH, canvas_width.max(2.0 * MIN_REGION_WIDTH));
        let particle_radius = positive_or(self.particle_radius, defaults.particle_radius)
            .min(REGION_HEIGHT);

        Self {
            canvas_width,
            canvas_height,
            spawn_width,
            particle_radius,
            spawn_rate: Self::clamp_spawn_rate(self.spawn_rate),
            speed_multiplier: Self::clamp_speed_multiplier(self.speed_multiplier),
            max_live_particles: self.max_live_particles.max(1),
            seed: self.seed,
        }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "Using default settings ({}: {})",
                    path.as_ref().display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
