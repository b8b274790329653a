//! Rendering boundary
//!
//! The drawing layer never touches simulation internals. After each tick it
//! takes a [`FrameSnapshot`]: every live particle with its bucket-so-far
//! (for color coding), both region bounds, and the observed statistics next to
//! the expected proportions.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::{Comparison, Layout, Outcome, Proportions, RunningStatistics, SimPhase, Simulation};

/// One particle as the drawing layer sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub outcome: Outcome,
    /// 0xRRGGBB
    pub color: u32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub phase: SimPhase,
    pub frame: u64,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub particles: Vec<ParticleView>,
    pub layout: Layout,
    pub stats: RunningStatistics,
    pub observed: Proportions,
    pub expected: Proportions,
    pub comparison: Comparison,
}

impl FrameSnapshot {
    pub fn capture<R: Rng>(sim: &Simulation<R>) -> Self {
        let particles = sim
            .particles()
            .iter()
            .map(|p| {
                let outcome = p.outcome();
                ParticleView {
                    id: p.id,
                    x: p.pos.x,
                    y: p.pos.y,
                    radius: p.radius,
                    outcome,
                    color: outcome.color(),
                }
            })
            .collect();

        let stats = *sim.statistics();
        let expected = Proportions::expected(sim.inputs());
        Self {
            phase: sim.phase(),
            frame: sim.frame(),
            canvas_width: sim.settings().canvas_width,
            canvas_height: sim.settings().canvas_height,
            particles,
            layout: *sim.layout(),
            stats,
            observed: stats.proportions(),
            expected,
            comparison: Comparison::new(&stats, &expected),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Plain-text expected vs. observed table
    pub fn summary_table(&self) -> String {
        let mut out = format!(
            "{:<10} {:<10} {:>8} {:>10} {:>10}\n",
            "outcome", "event", "count", "observed", "expected"
        );
        for row in &self.comparison.rows {
            out.push_str(&format!(
                "{:<10} {:<10} {:>8} {:>10.4} {:>10.4}\n",
                row.outcome.as_str(),
                row.outcome.label(),
                row.count,
                row.observed,
                row.expected
            ));
        }
        out.push_str(&format!(
            "{:<10} {:<10} {:>8}  max deviation {:.4}\n",
            "total",
            "",
            self.comparison.total,
            self.comparison.max_deviation()
        ));
        out
    }
}

impl<R: Rng> Simulation<R> {
    /// Snapshot for the drawing layer
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self)
    }
}
