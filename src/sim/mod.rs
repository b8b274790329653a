//! Deterministic simulation module
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - One frame per tick, no wall-clock time
//! - Seeded (or injected) RNG only
//! - Stable iteration order (by particle ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod layout;
pub mod state;
pub mod stats;
pub mod tick;

pub use collision::{StepResult, particle_region_collision, should_retire, step_particle};
pub use layout::{Layout, Region, resolve_layout};
pub use state::{FrameCounts, Particle, SimPhase, Simulation};
pub use stats::{Comparison, ComparisonRow, Outcome, Proportions, RunningStatistics};
pub use tick::{TickInput, TickReport, apply_input, tick};
