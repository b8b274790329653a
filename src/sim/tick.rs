//! Frame scheduler
//!
//! One call to [`tick`] is one frame. User commands queued in a
//! [`TickInput`] are applied before any simulation work, so a frame always
//! sees a consistent set of controls.

use rand::Rng;

use super::collision::step_particle;
use super::state::{FrameCounts, SimPhase, Simulation};
use crate::probability::ProbabilitySource;

/// Commands collected between frames
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Clear everything and return to Idle
    pub reset: bool,
    /// New spawn rate (clamped)
    pub spawn_rate: Option<f32>,
    /// New speed multiplier (clamped)
    pub speed_multiplier: Option<f32>,
    pub pause: bool,
    pub start: bool,
    /// Start if not running, pause if running
    pub toggle_running: bool,
}

impl TickInput {
    /// Clear one-shot commands after they have been applied
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// What a frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Whether a simulation frame actually ran
    pub advanced: bool,
    pub spawned: u32,
    pub retired: u32,
}

/// Apply queued commands in a fixed order: reset, controls, pause, start, toggle
pub fn apply_input<R: Rng>(sim: &mut Simulation<R>, input: &TickInput) {
    if input.reset {
        sim.reset();
    }
    if let Some(rate) = input.spawn_rate {
        sim.set_spawn_rate(rate);
    }
    if let Some(multiplier) = input.speed_multiplier {
        sim.set_speed_multiplier(multiplier);
    }
    if input.pause {
        sim.pause();
    }
    if input.start {
        sim.start();
    }
    if input.toggle_running {
        sim.toggle_running();
    }
}

/// Advance the simulation by one frame
pub fn tick<R: Rng, S: ProbabilitySource + ?Sized>(
    sim: &mut Simulation<R>,
    input: &TickInput,
    probabilities: &S,
) -> TickReport {
    apply_input(sim, input);

    // Idle and Paused keep the last completed frame untouched
    if sim.phase() != SimPhase::Running {
        return TickReport::default();
    }

    let counts = sim.advance_frame(probabilities);
    TickReport {
        advanced: true,
        spawned: counts.spawned,
        retired: counts.retired,
    }
}

impl<R: Rng> Simulation<R> {
    /// Run one frame: spawn, integrate and collide, classify, refresh layout
    pub(crate) fn advance_frame<S: ProbabilitySource + ?Sized>(&mut self, probabilities: &S) -> FrameCounts {
        let spawned = self.spawn_particles();

        let floor_y = self.settings().canvas_height;
        let speed = self.settings().speed_multiplier;
        let layout = self.layout;
        for particle in &mut self.particles {
            step_particle(particle, &layout, floor_y, speed);
        }

        let retired = self.retire_inactive();
        debug_assert!(self.stats.is_consistent());

        self.refresh_layout(probabilities);
        self.frame += 1;

        if retired > 0 {
            log::trace!(
                "Frame {}: +{} spawned, {} retired, {} live",
                self.frame,
                spawned,
                retired,
                self.particles.len()
            );
        }

        FrameCounts { spawned, retired }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::probability::ProbabilityInputs;
    use crate::settings::Settings;
    use crate::sim::stats::{Comparison, Proportions};

    fn demo_inputs() -> ProbabilityInputs {
        ProbabilityInputs::from_base(0.2, 0.2, 0.1)
    }

    fn running_sim(seed: u64) -> Simulation {
        let settings = Settings {
            seed,
            spawn_rate: MAX_SPAWN_RATE,
            ..Default::default()
        };
        let mut sim = Simulation::new(settings);
        sim.start();
        sim
    }

    #[test]
    fn test_idle_does_nothing() {
        let mut sim = Simulation::new(Settings::default());
        let report = tick(&mut sim, &TickInput::default(), &demo_inputs());
        assert!(!report.advanced);
        assert_eq!(sim.frame(), 0);
        assert!(sim.particles().is_empty());
    }

    #[test]
    fn test_toggle_running() {
        let mut sim = Simulation::new(Settings::default());
        let toggle = TickInput {
            toggle_running: true,
            ..Default::default()
        };

        let report = tick(&mut sim, &toggle, &demo_inputs());
        assert_eq!(sim.phase(), SimPhase::Running);
        assert!(report.advanced);

        let report = tick(&mut sim, &toggle, &demo_inputs());
        assert_eq!(sim.phase(), SimPhase::Paused);
        assert!(!report.advanced);
    }

    #[test]
    fn test_counts_stay_consistent() {
        let mut sim = running_sim(1);
        let input = TickInput::default();
        for _ in 0..2_000 {
            tick(&mut sim, &input, &demo_inputs());
            let stats = sim.statistics();
            assert_eq!(stats.a_only + stats.b_only + stats.both + stats.neither, stats.total);
        }
        assert!(sim.statistics().total > 0);
    }

    #[test]
    fn test_every_particle_counted_once() {
        let mut sim = running_sim(2);
        let input = TickInput::default();
        let mut spawned = 0u64;
        let mut retired = 0u64;
        for _ in 0..1_500 {
            let report = tick(&mut sim, &input, &demo_inputs());
            spawned += u64::from(report.spawned);
            retired += u64::from(report.retired);
        }
        assert_eq!(retired, sim.statistics().total);
        assert_eq!(spawned, retired + sim.particles().len() as u64);
    }

    #[test]
    fn test_empirical_proportions_converge() {
        let inputs = demo_inputs();
        let mut sim = running_sim(20240611);
        let input = TickInput::default();

        let mut frames = 0;
        while sim.statistics().total < 2_000 {
            tick(&mut sim, &input, &inputs);
            frames += 1;
            assert!(frames < 100_000, "simulation stopped retiring particles");
        }

        let expected = Proportions::expected(&inputs);
        let comparison = Comparison::new(sim.statistics(), &expected);
        for row in &comparison.rows {
            assert!(
                row.deviation < 0.05,
                "{:?}: observed {:.3}, expected {:.3}",
                row.outcome,
                row.observed,
                row.expected
            );
        }
    }

    #[test]
    fn test_short_canvas_still_separates_outcomes() {
        let inputs = ProbabilityInputs::from_base(0.5, 0.5, 0.3);
        let mut sim = Simulation::new(Settings {
            canvas_height: 150.0,
            spawn_rate: MAX_SPAWN_RATE,
            ..Default::default()
        });
        assert!(sim.settings().canvas_height > REGION_Y + REGION_HEIGHT);
        sim.start();

        let mut frames = 0;
        while sim.statistics().total < 500 {
            tick(&mut sim, &TickInput::default(), &inputs);
            frames += 1;
            assert!(frames < 50_000, "simulation stopped retiring particles");
        }

        let observed = sim.statistics().proportions();
        assert!(sim.statistics().both > 0);
        assert!(observed.both > 0.2, "both = {:.3}", observed.both);
    }

    #[test]
    fn test_reset_from_any_state() {
        for ticks_before_reset in [0, 10, 500] {
            let mut sim = running_sim(3);
            for _ in 0..ticks_before_reset {
                tick(&mut sim, &TickInput::default(), &demo_inputs());
            }
            let reset = TickInput {
                reset: true,
                ..Default::default()
            };
            tick(&mut sim, &reset, &demo_inputs());

            assert_eq!(sim.phase(), SimPhase::Idle);
            assert_eq!(sim.statistics().total, 0);
            assert!(sim.particles().is_empty());
        }
    }

    #[test]
    fn test_reset_while_paused() {
        let mut sim = running_sim(4);
        for _ in 0..300 {
            tick(&mut sim, &TickInput::default(), &demo_inputs());
        }
        sim.pause();
        sim.reset();
        assert_eq!(sim.phase(), SimPhase::Idle);
        assert_eq!(sim.statistics().total, 0);
        assert!(sim.particles().is_empty());
    }

    #[test]
    fn test_pause_preserves_state_and_is_idempotent() {
        let mut sim = running_sim(5);
        for _ in 0..200 {
            tick(&mut sim, &TickInput::default(), &demo_inputs());
        }

        sim.pause();
        let particles = sim.particles().to_vec();
        let stats = *sim.statistics();
        let frame = sim.frame();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        for _ in 0..10 {
            let report = tick(&mut sim, &pause, &demo_inputs());
            assert!(!report.advanced);
        }
        sim.pause();

        assert_eq!(sim.phase(), SimPhase::Paused);
        assert_eq!(sim.particles(), particles.as_slice());
        assert_eq!(*sim.statistics(), stats);
        assert_eq!(sim.frame(), frame);
    }

    #[test]
    fn test_resume_continues_from_pause() {
        let mut sim = running_sim(6);
        for _ in 0..50 {
            tick(&mut sim, &TickInput::default(), &demo_inputs());
        }
        sim.pause();
        sim.start();
        let report = tick(&mut sim, &TickInput::default(), &demo_inputs());
        assert!(report.advanced);
        assert_eq!(sim.frame(), 51);
    }

    #[test]
    fn test_spawn_rate_command_is_clamped() {
        let mut sim = Simulation::new(Settings::default());
        let input = TickInput {
            spawn_rate: Some(0.9),
            speed_multiplier: Some(10.0),
            ..Default::default()
        };
        tick(&mut sim, &input, &demo_inputs());
        assert_eq!(sim.settings().spawn_rate, MAX_SPAWN_RATE);
        assert_eq!(sim.settings().speed_multiplier, MAX_SPEED_MULTIPLIER);
    }

    #[test]
    fn test_malformed_probabilities_keep_sim_valid() {
        let mut sim = running_sim(7);
        let bad = ProbabilityInputs {
            p_a: f64::NAN,
            p_b: f64::INFINITY,
            p_ab: -3.0,
            p_a_only: f64::NAN,
            p_b_only: 7.0,
            p_neither: -1.0,
        };
        for _ in 0..1_000 {
            tick(&mut sim, &TickInput::default(), &bad);
        }
        assert!(sim.statistics().is_consistent());
        assert!(sim.particles().iter().all(|p| p.pos.is_finite()));
        assert!(sim.layout().a.x.is_finite() && sim.layout().b.x.is_finite());
    }

    #[test]
    fn test_determinism() {
        // Two simulations with the same seed should produce identical results
        let mut sim1 = running_sim(99999);
        let mut sim2 = running_sim(99999);
        for _ in 0..500 {
            tick(&mut sim1, &TickInput::default(), &demo_inputs());
            tick(&mut sim2, &TickInput::default(), &demo_inputs());
        }
        assert_eq!(sim1.statistics(), sim2.statistics());
        assert_eq!(sim1.particles(), sim2.particles());
    }

    #[test]
    fn test_injected_rng() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let mut sim = Simulation::with_rng(Settings::default(), StdRng::seed_from_u64(11));
        sim.start();
        for _ in 0..500 {
            tick(&mut sim, &TickInput::default(), &demo_inputs());
        }
        assert!(sim.statistics().total > 0);
    }
}
