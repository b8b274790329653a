//! Per-frame integration and collision response
//!
//! Particles fall straight down under gravity. The first time a particle
//! touches a region it is bounced upward and the region's flag is set; after
//! that the region no longer collides with it, so the particle passes through
//! on its way back down and may still strike the other region. The flags are
//! never cleared, so a retired particle's bucket is the union of every region
//! it touched, not just the last one.

use super::layout::{Layout, Region};
use super::state::Particle;
use crate::consts::*;

/// Everything that happened to one particle during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepResult {
    pub struck_a: bool,
    pub struck_b: bool,
    pub floor_bounce: bool,
    pub retired: bool,
}

/// Test a particle against a region.
///
/// Horizontally only the particle's centre counts, so a band of width `w`
/// catches exactly the particles dropped over those `w` pixels. Vertically the
/// bounding square is used. `prev_bottom` is the particle's bottom edge before
/// this frame's integration; a downward crossing of the region's top edge
/// counts as a hit even when the particle moved far enough to skip past the
/// band entirely.
pub fn particle_region_collision(particle: &Particle, prev_bottom: f32, region: &Region) -> bool {
    let horizontal = particle.pos.x >= region.left() && particle.pos.x < region.right();
    if !horizontal {
        return false;
    }

    let bottom = particle.bottom();
    let top = particle.pos.y - particle.radius;
    let overlapping = bottom > region.top() && top < region.bottom();
    let crossed = prev_bottom <= region.top() && bottom >= region.top();

    overlapping || crossed
}

/// First-contact response: rest on top of the band, bounce up, stop drifting
fn resolve_region_contact(particle: &mut Particle, region: &Region) {
    particle.pos.y = region.top() - particle.radius;
    particle.vel.y = -particle.vel.y.abs() * RESTITUTION;
    particle.vel.x = 0.0;
}

/// Advance one particle by one frame and resolve its collisions
pub fn step_particle(
    particle: &mut Particle,
    layout: &Layout,
    floor_y: f32,
    speed_multiplier: f32,
) -> StepResult {
    let mut result = StepResult::default();
    if !particle.active {
        return result;
    }

    let prev_bottom = particle.bottom();
    particle.age_ticks += 1;

    // Integrate
    particle.vel.y += GRAVITY * speed_multiplier;
    particle.pos.x += particle.vel.x * speed_multiplier;
    particle.pos.y += particle.vel.y * speed_multiplier;

    // Both bands are tested against the same position before either responds
    let hit_a = !particle.struck_a && particle_region_collision(particle, prev_bottom, &layout.a);
    let hit_b = !particle.struck_b && particle_region_collision(particle, prev_bottom, &layout.b);
    if hit_a {
        particle.struck_a = true;
        result.struck_a = true;
    }
    if hit_b {
        particle.struck_b = true;
        result.struck_b = true;
    }
    // Bands share a top edge, so one response covers either hit
    if hit_a {
        resolve_region_contact(particle, &layout.a);
    } else if hit_b {
        resolve_region_contact(particle, &layout.b);
    }

    // Floor
    if particle.bottom() >= floor_y {
        if particle.bounce_count < MAX_BOUNCES && particle.vel.y.abs() > MIN_BOUNCE_SPEED {
            particle.pos.y = floor_y - particle.radius;
            particle.vel.y = -particle.vel.y.abs() * RESTITUTION;
            particle.bounce_count += 1;
            result.floor_bounce = true;
        } else {
            particle.active = false;
        }
    }

    if particle.active && should_retire(particle, floor_y) {
        particle.active = false;
    }

    result.retired = !particle.active;
    result
}

/// Secondary retirement conditions (runaway or settled particles)
pub fn should_retire(particle: &Particle, floor_y: f32) -> bool {
    let off_screen = particle.pos.y - particle.radius > floor_y + OFFSCREEN_MARGIN;
    let settled = particle.bounce_count >= MAX_BOUNCES && particle.vel.y.abs() < MIN_BOUNCE_SPEED;
    let corrupted = !particle.pos.is_finite() || !particle.vel.is_finite();
    let expired = particle.age_ticks >= MAX_LIFETIME_TICKS;

    off_screen || settled || corrupted || expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probability::ProbabilityInputs;
    use crate::sim::layout::resolve_layout;
    use glam::Vec2;

    fn test_layout() -> Layout {
        // A spans [175, 275], B spans [225, 325]
        let inputs = ProbabilityInputs::from_base(0.2, 0.2, 0.1);
        resolve_layout(&inputs, 0.0, 500.0)
    }

    fn particle_at(x: f32, y: f32, vy: f32) -> Particle {
        Particle::new(1, Vec2::new(x, y), Vec2::new(0.0, vy), PARTICLE_RADIUS)
    }

    /// Step until the particle retires, returning the number of frames taken
    fn run_to_retirement(p: &mut Particle, layout: &Layout) -> u32 {
        let mut frames = 0;
        while p.active {
            step_particle(p, layout, CANVAS_HEIGHT, 1.0);
            frames += 1;
            assert!(frames <= MAX_LIFETIME_TICKS);
        }
        frames
    }

    #[test]
    fn test_integration() {
        let layout = test_layout();
        let mut p = particle_at(10.0, 0.0, 1.0);
        step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);
        assert!((p.vel.y - (1.0 + GRAVITY)).abs() < 1e-6);
        assert!((p.pos.y - (1.0 + GRAVITY)).abs() < 1e-6);
        assert_eq!(p.age_ticks, 1);
    }

    #[test]
    fn test_speed_multiplier_scales_step() {
        let layout = test_layout();
        let mut slow = particle_at(10.0, 0.0, 1.0);
        let mut fast = particle_at(10.0, 0.0, 1.0);
        step_particle(&mut slow, &layout, CANVAS_HEIGHT, 0.5);
        step_particle(&mut fast, &layout, CANVAS_HEIGHT, 2.0);
        assert!(fast.pos.y > slow.pos.y);
    }

    #[test]
    fn test_region_a_contact() {
        let layout = test_layout();
        let top = layout.a.top();
        let mut p = particle_at(190.0, top - PARTICLE_RADIUS - 1.0, 3.0);
        p.vel.x = 0.7;

        let result = step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);
        assert!(result.struck_a);
        assert!(!result.struck_b);
        assert!(p.struck_a);
        assert_eq!(p.pos.y, top - PARTICLE_RADIUS);
        assert!(p.vel.y < 0.0);
        assert!((p.vel.y + (3.0 + GRAVITY) * RESTITUTION).abs() < 1e-5);
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn test_fast_particle_does_not_tunnel() {
        let layout = test_layout();
        let top = layout.a.top();
        // Would jump from above the band to below it in a single frame
        let mut p = particle_at(190.0, top - PARTICLE_RADIUS - 1.0, 60.0);
        let result = step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);
        assert!(result.struck_a);
    }

    #[test]
    fn test_particle_inside_both_bands_strikes_both() {
        // Layout moved under a particle that was already level with the bands
        let layout = test_layout();
        let mut p = particle_at(250.0, layout.a.top() + 5.0, 1.0);
        let result = step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);

        assert!(result.struck_a && result.struck_b);
        assert_eq!(p.outcome(), crate::sim::Outcome::Both);
        assert_eq!(p.pos.y, layout.a.top() - PARTICLE_RADIUS);
        assert!(p.vel.y < 0.0);
    }

    #[test]
    fn test_band_edges_use_particle_centre() {
        let layout = test_layout();
        let top = layout.a.top();

        // Bounding square overlaps A, centre does not
        let mut left_of_a = particle_at(layout.a.left() - 1.0, top - PARTICLE_RADIUS - 1.0, 3.0);
        assert!(!step_particle(&mut left_of_a, &layout, CANVAS_HEIGHT, 1.0).struck_a);

        // Centre just inside B's left edge lands in the overlap
        let mut at_b_edge = particle_at(layout.b.left(), top - PARTICLE_RADIUS - 1.0, 3.0);
        let result = step_particle(&mut at_b_edge, &layout, CANVAS_HEIGHT, 1.0);
        assert!(result.struck_a && result.struck_b);

        // A's right edge is exclusive
        let mut at_a_right = particle_at(layout.a.right(), top - PARTICLE_RADIUS - 1.0, 3.0);
        let result = step_particle(&mut at_a_right, &layout, CANVAS_HEIGHT, 1.0);
        assert!(!result.struck_a && result.struck_b);
    }

    #[test]
    fn test_outcomes_by_column() {
        let layout = test_layout();
        let cases = [
            (190.0, true, false),
            (250.0, true, true),
            (310.0, false, true),
            (100.0, false, false),
            (450.0, false, false),
        ];
        for (x, want_a, want_b) in cases {
            let mut p = particle_at(x, SPAWN_Y, 0.5);
            run_to_retirement(&mut p, &layout);
            assert_eq!((p.struck_a, p.struck_b), (want_a, want_b), "x = {}", x);
        }
    }

    #[test]
    fn test_flags_are_sticky() {
        let layout = test_layout();
        let mut p = particle_at(250.0, SPAWN_Y, 0.5);
        let mut seen_a = false;
        while p.active {
            step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);
            if seen_a {
                assert!(p.struck_a);
            }
            seen_a |= p.struck_a;
        }
        assert!(seen_a);
    }

    #[test]
    fn test_floor_bounces_then_retires() {
        let layout = test_layout();
        let mut p = particle_at(450.0, SPAWN_Y, 0.0);
        let mut bounces = 0;
        while p.active {
            let r = step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);
            if r.floor_bounce {
                bounces += 1;
            }
        }
        assert!(bounces >= 1);
        assert!(bounces <= MAX_BOUNCES);
        assert_eq!(p.bounce_count, bounces);
    }

    #[test]
    fn test_settled_particle_retires_next_tick() {
        let layout = test_layout();
        let mut p = particle_at(450.0, CANVAS_HEIGHT - 50.0, -0.1);
        p.bounce_count = MAX_BOUNCES;
        let result = step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);
        assert!(result.retired);
        assert!(!p.active);
    }

    #[test]
    fn test_slow_floor_contact_retires() {
        let layout = test_layout();
        let mut p = particle_at(450.0, CANVAS_HEIGHT - PARTICLE_RADIUS - 0.05, 0.1);
        let result = step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);
        assert!(result.retired);
        assert!(!result.floor_bounce);
    }

    #[test]
    fn test_runaway_particles_retire() {
        let layout = test_layout();

        let below = particle_at(450.0, CANVAS_HEIGHT + OFFSCREEN_MARGIN + 50.0, 0.0);
        assert!(should_retire(&below, CANVAS_HEIGHT));

        let mut broken = particle_at(450.0, 10.0, 0.0);
        broken.vel.y = f32::NAN;
        assert!(step_particle(&mut broken, &layout, CANVAS_HEIGHT, 1.0).retired);

        let mut old = particle_at(450.0, 10.0, 0.0);
        old.age_ticks = MAX_LIFETIME_TICKS;
        assert!(step_particle(&mut old, &layout, CANVAS_HEIGHT, 1.0).retired);
    }

    #[test]
    fn test_inactive_particle_untouched() {
        let layout = test_layout();
        let mut p = particle_at(190.0, 10.0, 1.0);
        p.active = false;
        let before = p.clone();
        let result = step_particle(&mut p, &layout, CANVAS_HEIGHT, 1.0);
        assert_eq!(p, before);
        assert!(!result.retired);
    }
}
