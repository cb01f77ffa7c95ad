// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

/// Layout configuration.
///
/// All dimensions are in canvas units (the rendering layer decides how they
/// map to pixels).  Missing fields deserialize to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    // Bubble sizing
    /// Radius of the lowest-ranked entity.
    pub min_entity_radius: f64,
    /// Radius of the highest-ranked entity.
    pub max_entity_radius: f64,
    /// Radius of the synthetic center entity.
    pub center_radius: f64,

    // Placement
    /// Space kept free between neighbouring bubbles.
    pub min_gap: f64,
    /// Space between the canvas edge and the outermost bubble.
    pub canvas_margin: f64,
    /// Extra distance between a bubble's edge and where its flows end.
    pub outer_ring_padding: f64,

    // Flow lines
    pub min_stroke_width: f64,
    pub max_stroke_width: f64,
    /// Space between the two halves of a bidirectional flow.
    pub parallel_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_entity_radius: 12.0,
            max_entity_radius: 48.0,
            center_radius: 36.0,
            min_gap: 16.0,
            canvas_margin: 24.0,
            outer_ring_padding: 4.0,
            min_stroke_width: 1.5,
            max_stroke_width: 14.0,
            parallel_gap: 2.0,
        }
    }
}

/// The drawing area the layout fills.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Canvas { width, height }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas {
            width: 960.0,
            height: 720.0,
        }
    }
}
