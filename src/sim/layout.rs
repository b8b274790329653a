//! Region geometry derived from the current probabilities
//!
//! Each event is drawn as a horizontal band whose width is proportional to
//! its probability. The two bands are laid out side by side, centred in the
//! spawn band, and overlap by exactly P(A∩B)·spawn_width pixels. A particle
//! dropped uniformly across the spawn band therefore strikes A, B, both, or
//! neither with (approximately) the modelled probabilities.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::probability::ProbabilityInputs;

/// An axis-aligned band (screen coordinates, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Placement of both regions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub a: Region,
    pub b: Region,
    /// Width shared by both bands
    pub overlap_width: f32,
}

/// Resolve region bounds from sanitized probabilities.
///
/// `spawn_left` and `spawn_width` describe the horizontal band particles are
/// dropped from.
pub fn resolve_layout(inputs: &ProbabilityInputs, spawn_left: f32, spawn_width: f32) -> Layout {
    let spawn_width = spawn_width.max(0.0);

    let red_width = (inputs.p_a as f32 * spawn_width).max(MIN_REGION_WIDTH);
    let blue_width = (inputs.p_b as f32 * spawn_width).max(MIN_REGION_WIDTH);
    // P(A∩B) > P(A) is inconsistent upstream; never overlap more than the narrower band
    let overlap_width = (inputs.p_ab as f32 * spawn_width)
        .max(0.0)
        .min(red_width.min(blue_width));

    let total = red_width + blue_width - overlap_width;
    let a_x = spawn_left + (spawn_width - total) / 2.0;
    let b_x = a_x + red_width - overlap_width;

    Layout {
        a: Region::new(a_x, REGION_Y, red_width, REGION_HEIGHT),
        b: Region::new(b_x, REGION_Y, blue_width, REGION_HEIGHT),
        overlap_width,
    }
}
