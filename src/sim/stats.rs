//! Outcome classification and running statistics

use serde::{Deserialize, Serialize};

use crate::probability::ProbabilityInputs;

/// The four disjoint buckets a retired particle can land in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Struck A but never B
    AOnly,
    /// Struck B but never A
    BOnly,
    /// Struck both regions at some point during its fall
    Both,
    /// Struck neither region
    Neither,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [Outcome::AOnly, Outcome::BOnly, Outcome::Both, Outcome::Neither];

    pub fn classify(struck_a: bool, struck_b: bool) -> Self {
        match (struck_a, struck_b) {
            (true, true) => Outcome::Both,
            (true, false) => Outcome::AOnly,
            (false, true) => Outcome::BOnly,
            (false, false) => Outcome::Neither,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::AOnly => "A only",
            Outcome::BOnly => "B only",
            Outcome::Both => "A and B",
            Outcome::Neither => "neither",
        }
    }

    /// Set-notation label matching the upstream variable names
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::AOnly => "P(A∩¬B)",
            Outcome::BOnly => "P(B∩¬A)",
            Outcome::Both => "P(A∩B)",
            Outcome::Neither => "P(¬A∩¬B)",
        }
    }

    /// Fill color (0xRRGGBB) used by the drawing layer
    pub fn color(&self) -> u32 {
        match self {
            Outcome::AOnly => 0xE0_4A_4A,
            Outcome::BOnly => 0x4A_7B_E0,
            Outcome::Both => 0x9B_4A_E0,
            Outcome::Neither => 0x9E_9E_9E,
        }
    }
}

/// Per-bucket fractions (each in [0, 1])
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Proportions {
    pub a_only: f64,
    pub b_only: f64,
    pub both: f64,
    pub neither: f64,
}

impl Proportions {
    /// Analytically expected proportions from the upstream model
    pub fn expected(inputs: &ProbabilityInputs) -> Self {
        Self {
            a_only: inputs.p_a_only,
            b_only: inputs.p_b_only,
            both: inputs.p_ab,
            neither: inputs.p_neither,
        }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::AOnly => self.a_only,
            Outcome::BOnly => self.b_only,
            Outcome::Both => self.both,
            Outcome::Neither => self.neither,
        }
    }
}

/// Observed counts of retired particles.
///
/// Counts only grow until `reset`. `total` is always the sum of the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunningStatistics {
    pub a_only: u64,
    pub b_only: u64,
    pub both: u64,
    pub neither: u64,
    pub total: u64,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one retired particle
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::AOnly => self.a_only += 1,
            Outcome::BOnly => self.b_only += 1,
            Outcome::Both => self.both += 1,
            Outcome::Neither => self.neither += 1,
        }
        self.total += 1;
    }

    /// Count a batch of retired particles (order does not matter)
    pub fn record_batch<I: IntoIterator<Item = Outcome>>(&mut self, outcomes: I) {
        for outcome in outcomes {
            self.record(outcome);
        }
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::AOnly => self.a_only,
            Outcome::BOnly => self.b_only,
            Outcome::Both => self.both,
            Outcome::Neither => self.neither,
        }
    }

    /// Empirical proportions; all zero before anything has retired
    pub fn proportions(&self) -> Proportions {
        if self.total == 0 {
            return Proportions::default();
        }
        let total = self.total as f64;
        Proportions {
            a_only: self.a_only as f64 / total,
            b_only: self.b_only as f64 / total,
            both: self.both as f64 / total,
            neither: self.neither as f64 / total,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.a_only + self.b_only + self.both + self.neither == self.total
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Expected vs observed for one bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub outcome: Outcome,
    pub count: u64,
    pub observed: f64,
    pub expected: f64,
    pub deviation: f64,
}

/// Side-by-side comparison of the simulation against the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
    pub total: u64,
}

impl Comparison {
    pub fn new(stats: &RunningStatistics, expected: &Proportions) -> Self {
        let observed = stats.proportions();
        let rows = Outcome::ALL
            .iter()
            .map(|&outcome| {
                let obs = observed.get(outcome);
                let exp = expected.get(outcome);
                ComparisonRow {
                    outcome,
                    count: stats.count(outcome),
                    observed: obs,
                    expected: exp,
                    deviation: (obs - exp).abs(),
                }
            })
            .collect();
        Self {
            rows,
            total: stats.total,
        }
    }

    /// Largest absolute deviation across buckets
    pub fn max_deviation(&self) -> f64 {
        self.rows.iter().map(|r| r.deviation).fold(0.0, f64::max)
    }
}
