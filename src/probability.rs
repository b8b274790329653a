//! Boundary to the upstream probability model
//!
//! The reactive-variable framework that owns P(A), P(B) and P(A∩B) lives
//! outside this crate. We only read from it, and never trust what we read:
//! every value is sanitized before it reaches geometry or physics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sanitize_probability;

/// Upstream variable names
pub mod names {
    pub const P_A: &str = "P(A)";
    pub const P_B: &str = "P(B)";
    pub const P_A_AND_B: &str = "P(A∩B)";
    pub const P_A_ONLY: &str = "P(A∩¬B)";
    pub const P_B_ONLY: &str = "P(B∩¬A)";
    pub const P_NEITHER: &str = "P(¬A∩¬B)";
}

/// Read access to the upstream probability model.
///
/// Unknown variables should be reported as `f64::NAN`.
pub trait ProbabilitySource {
    fn get_variable(&self, name: &str) -> f64;
}

impl ProbabilitySource for HashMap<String, f64> {
    fn get_variable(&self, name: &str) -> f64 {
        self.get(name).copied().unwrap_or(f64::NAN)
    }
}

/// Sanitized snapshot of the upstream probabilities
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilityInputs {
    pub p_a: f64,
    pub p_b: f64,
    pub p_ab: f64,
    /// P(A∩¬B)
    pub p_a_only: f64,
    /// P(B∩¬A)
    pub p_b_only: f64,
    /// P(¬A∩¬B)
    pub p_neither: f64,
}

impl ProbabilityInputs {
    /// Build from the three base probabilities, deriving the decomposition
    pub fn from_base(p_a: f64, p_b: f64, p_ab: f64) -> Self {
        let p_a = sanitize_probability(p_a);
        let p_b = sanitize_probability(p_b);
        let p_ab = sanitize_probability(p_ab);
        Self {
            p_a,
            p_b,
            p_ab,
            p_a_only: sanitize_probability(p_a - p_ab),
            p_b_only: sanitize_probability(p_b - p_ab),
            p_neither: sanitize_probability(1.0 - p_a - p_b + p_ab),
        }
    }

    /// Read every variable from the upstream model.
    ///
    /// Derived values are taken from upstream when present, otherwise computed
    /// from the base three. The second value reports whether anything had to
    /// be repaired (non-finite, out of range, or a decomposition that does
    /// not sum to 1).
    pub fn read<S: ProbabilitySource + ?Sized>(source: &S) -> (Self, bool) {
        let raw_a = source.get_variable(names::P_A);
        let raw_b = source.get_variable(names::P_B);
        let raw_ab = source.get_variable(names::P_A_AND_B);

        let mut malformed = [raw_a, raw_b, raw_ab].iter().any(|v| !in_unit_range(*v));
        let mut inputs = Self::from_base(raw_a, raw_b, raw_ab);

        let mut derived = |name: &str, fallback: f64| -> f64 {
            let raw = source.get_variable(name);
            if raw.is_nan() {
                // Not published upstream; keep our own derivation
                return fallback;
            }
            if !in_unit_range(raw) {
                malformed = true;
            }
            sanitize_probability(raw)
        };
        inputs.p_a_only = derived(names::P_A_ONLY, inputs.p_a_only);
        inputs.p_b_only = derived(names::P_B_ONLY, inputs.p_b_only);
        inputs.p_neither = derived(names::P_NEITHER, inputs.p_neither);

        if (inputs.decomposition_sum() - 1.0).abs() > 1e-6 {
            malformed = true;
        }

        (inputs, malformed)
    }

    /// Sum of the four disjoint outcome probabilities (should be 1)
    pub fn decomposition_sum(&self) -> f64 {
        self.p_a_only + self.p_b_only + self.p_ab + self.p_neither
    }
}

impl ProbabilitySource for ProbabilityInputs {
    fn get_variable(&self, name: &str) -> f64 {
        match name {
            names::P_A => self.p_a,
            names::P_B => self.p_b,
            names::P_A_AND_B => self.p_ab,
            names::P_A_ONLY => self.p_a_only,
            names::P_B_ONLY => self.p_b_only,
            names::P_NEITHER => self.p_neither,
            _ => f64::NAN,
        }
    }
}

#[inline]
fn in_unit_range(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
