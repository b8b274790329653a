//! Simulation state and core types
//!
//! Everything the frame loop mutates lives in [`Simulation`]: the live
//! particle set, the running statistics, the current region layout and the
//! seeded RNG. Nothing here is global, so an engine can be embedded (or
//! tested) without any rendering context.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::layout::{Layout, resolve_layout};
use super::stats::{Outcome, RunningStatistics};
use crate::consts::*;
use crate::probability::{ProbabilityInputs, ProbabilitySource};
use crate::settings::Settings;

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimPhase {
    /// Nothing scheduled, state is empty
    #[default]
    Idle,
    /// Frames are being simulated
    Running,
    /// State kept as of the last completed frame, no new frames
    Paused,
}

impl SimPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimPhase::Idle => "Idle",
            SimPhase::Running => "Running",
            SimPhase::Paused => "Paused",
        }
    }
}

/// A falling particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Sticky: once set, stays set for the particle's lifetime
    pub struck_a: bool,
    pub struck_b: bool,
    pub bounce_count: u32,
    /// Frames since spawn
    pub age_ticks: u32,
    pub active: bool,
}

impl Particle {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            struck_a: false,
            struck_b: false,
            bounce_count: 0,
            age_ticks: 0,
            active: true,
        }
    }

    /// Bucket this particle would land in if it retired now
    pub fn outcome(&self) -> Outcome {
        Outcome::classify(self.struck_a, self.struck_b)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }
}

/// Counts from a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCounts {
    pub spawned: u32,
    pub retired: u32,
}

/// Owned simulation state, generic over the random source
#[derive(Debug, Clone)]
pub struct Simulation<R = Pcg32> {
    settings: Settings,
    pub(crate) phase: SimPhase,
    /// Frames completed since the last reset
    pub(crate) frame: u64,
    /// Live particles (ascending id)
    pub(crate) particles: Vec<Particle>,
    pub(crate) stats: RunningStatistics,
    pub(crate) layout: Layout,
    /// Last sanitized upstream read
    pub(crate) inputs: ProbabilityInputs,
    pub(crate) inputs_malformed: bool,
    rng: R,
    next_id: u32,
}

impl Simulation<Pcg32> {
    /// Create a simulation seeded from `settings.seed`
    pub fn new(settings: Settings) -> Self {
        let rng = Pcg32::seed_from_u64(settings.seed);
        Self::with_rng(settings, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Create a simulation driven by a caller-supplied random source
    pub fn with_rng(settings: Settings, rng: R) -> Self {
        let settings = settings.sanitized();
        let inputs = ProbabilityInputs::default();
        let layout = resolve_layout(&inputs, settings.spawn_left(), settings.spawn_width);
        Self {
            settings,
            phase: SimPhase::Idle,
            frame: 0,
            particles: Vec::new(),
            stats: RunningStatistics::new(),
            layout,
            inputs,
            inputs_malformed: false,
            rng,
            next_id: 1,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SimPhase::Running
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn statistics(&self) -> &RunningStatistics {
        &self.stats
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn inputs(&self) -> &ProbabilityInputs {
        &self.inputs
    }

    /// Allocate a new particle ID
    pub fn next_particle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Idle/Paused → Running
    pub fn start(&mut self) {
        if self.phase != SimPhase::Running {
            log::info!("Simulation started at frame {}", self.frame);
            self.phase = SimPhase::Running;
        }
    }

    /// Running → Paused; no-op otherwise
    pub fn pause(&mut self) {
        if self.phase == SimPhase::Running {
            log::info!(
                "Simulation paused at frame {} ({} live, {} retired)",
                self.frame,
                self.particles.len(),
                self.stats.total
            );
            self.phase = SimPhase::Paused;
        }
    }

    pub fn toggle_running(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Any phase → Idle, dropping all particles and statistics
    pub fn reset(&mut self) {
        log::info!(
            "Simulation reset ({} live particles dropped, {} retired cleared)",
            self.particles.len(),
            self.stats.total
        );
        self.particles.clear();
        self.next_id = 1;
        self.stats.reset();
        self.frame = 0;
        self.phase = SimPhase::Idle;
    }

    /// Set the per-frame drop probability, clamped to the supported range
    pub fn set_spawn_rate(&mut self, rate: f32) {
        let clamped = Settings::clamp_spawn_rate(rate);
        if clamped != rate {
            log::debug!("Spawn rate {} clamped to {}", rate, clamped);
        }
        self.settings.spawn_rate = clamped;
    }

    /// Set the simulation speed multiplier, clamped to the supported range
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        let clamped = Settings::clamp_speed_multiplier(multiplier);
        if clamped != multiplier {
            log::debug!("Speed multiplier {} clamped to {}", multiplier, clamped);
        }
        self.settings.speed_multiplier = clamped;
    }

    /// Re-read upstream probabilities and recompute region bounds
    pub fn refresh_layout<S: ProbabilitySource + ?Sized>(&mut self, source: &S) {
        let (inputs, malformed) = ProbabilityInputs::read(source);
        if malformed && !self.inputs_malformed {
            log::warn!(
                "Malformed upstream probabilities, using sanitized P(A)={:.3} P(B)={:.3} P(A∩B)={:.3}",
                inputs.p_a,
                inputs.p_b,
                inputs.p_ab
            );
        } else if !malformed && self.inputs_malformed {
            log::info!("Upstream probabilities valid again");
        }
        self.inputs = inputs;
        self.inputs_malformed = malformed;
        self.layout = resolve_layout(&inputs, self.settings.spawn_left(), self.settings.spawn_width);
    }

    /// Bernoulli-gated spawn: with probability `spawn_rate`, drop 1-3 particles
    pub fn spawn_particles(&mut self) -> u32 {
        if !self.rng.random_bool(f64::from(self.settings.spawn_rate)) {
            return 0;
        }

        let count: u32 = self.rng.random_range(1..=3);
        let mut spawned = 0;
        for _ in 0..count {
            if self.particles.len() >= self.settings.max_live_particles {
                break;
            }
            let x = self.settings.spawn_left() + self.rng.random::<f32>() * self.settings.spawn_width;
            let vy = self.rng.random::<f32>() * INITIAL_VY_MAX;
            let id = self.next_particle_id();
            self.particles.push(Particle::new(
                id,
                Vec2::new(x, SPAWN_Y),
                Vec2::new(0.0, vy),
                self.settings.particle_radius,
            ));
            spawned += 1;
        }
        spawned
    }

    /// Remove inactive particles from the live set and count each one once
    pub fn retire_inactive(&mut self) -> u32 {
        let mut retired = Vec::new();
        self.particles.retain(|p| {
            if !p.active {
                retired.push(p.outcome());
            }
            p.active
        });
        self.stats.record_batch(retired.iter().copied());
        retired.len() as u32
    }
}
