// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Bubble sizing and placement on a circle.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::datamodel::{Entity, EntityId};
use crate::stats::{lerp_sqrt_rank, rank_by};

use super::config::{Canvas, LayoutConfig};
use super::geometry::{Position, Rect};

const TWO_PI: f64 = 2.0 * PI;

/// An entity with its derived size and position for one render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaidOutEntity {
    pub id: EntityId,
    pub label: String,
    pub magnitude: f64,
    pub relative_size: f64,
    pub percentile_rank: f64,
    pub radius: f64,
    pub position: Position,
    pub is_center: bool,
}

impl LaidOutEntity {
    pub fn bounds(&self) -> Rect {
        Rect::around_circle(self.position, self.radius)
    }
}

/// The synthetic hub appended after the input entities.
#[derive(Clone, Debug, PartialEq)]
pub struct CenterEntity {
    pub id: EntityId,
    pub label: String,
}

/// Radius of a bubble at `percentile_rank`, scaled by the square root of
/// the rank.
pub fn entity_radius(percentile_rank: f64, config: &LayoutConfig) -> f64 {
    lerp_sqrt_rank(
        config.min_entity_radius,
        config.max_entity_radius,
        percentile_rank,
    )
}

/// Angle of slot `i` out of `n`, clockwise from the top of the canvas.
pub fn slot_angle(i: usize, n: usize) -> f64 {
    if n == 0 {
        return -PI / 2.0;
    }
    TWO_PI * i as f64 / n as f64 - PI / 2.0
}

/// Radius of the circle the bubbles sit on.
///
/// Uses as much of the canvas as fits, but never less than the radius at
/// which neighbouring bubbles of `max_entity_radius` are at least `min_gap`
/// plus both outer rings apart, measured along the chord between their
/// centers.  With a center bubble present the ring also stays clear of it
/// by the same margin.
pub fn placement_radius(
    n: usize,
    max_entity_radius: f64,
    has_center: bool,
    canvas: Canvas,
    config: &LayoutConfig,
) -> f64 {
    if n == 0 {
        return 0.0;
    }

    let fit = (canvas.width.min(canvas.height) / 2.0 - config.canvas_margin - max_entity_radius)
        .max(0.0);
    let padding = 2.0 * config.outer_ring_padding.max(0.0);
    // neighbours sit 2r·sin(π/n) apart
    let no_overlap = if n >= 2 {
        (2.0 * max_entity_radius + config.min_gap + padding) / (2.0 * (PI / n as f64).sin())
    } else {
        0.0
    };
    let clear_of_center = if has_center {
        config.center_radius + max_entity_radius + config.min_gap + padding
    } else {
        0.0
    };

    fit.max(no_overlap).max(clear_of_center)
}

/// Size and place every entity, plus the center entity if given.
///
/// Input entities are ranked by magnitude and placed in input order around
/// the circle; the center entity sits at the middle of the canvas.
pub fn place_entities(
    entities: &[Entity],
    center: Option<&CenterEntity>,
    canvas: Canvas,
    config: &LayoutConfig,
) -> Vec<LaidOutEntity> {
    let ranked = rank_by(entities, |e| e.magnitude);
    let radii: Vec<f64> = ranked
        .iter()
        .map(|r| entity_radius(r.percentile_rank, config))
        .collect();
    let max_radius = radii.iter().copied().fold(0.0_f64, f64::max);

    let n = entities.len();
    let middle = Position::new(canvas.width / 2.0, canvas.height / 2.0);
    let ring = placement_radius(n, max_radius, center.is_some(), canvas, config);

    let mut placed: Vec<LaidOutEntity> = ranked
        .iter()
        .zip(radii)
        .enumerate()
        .map(|(i, (r, radius))| LaidOutEntity {
            id: r.item.id,
            label: r.item.label.clone(),
            magnitude: r.value,
            relative_size: r.relative_size,
            percentile_rank: r.percentile_rank,
            radius,
            position: middle + Position::from_angle(slot_angle(i, n)) * ring,
            is_center: false,
        })
        .collect();

    if let Some(center) = center {
        placed.push(LaidOutEntity {
            id: center.id,
            label: center.label.clone(),
            magnitude: placed.iter().map(|e| e.magnitude).sum(),
            relative_size: 100.0,
            percentile_rank: 100.0,
            radius: config.center_radius,
            position: middle,
            is_center: true,
        });
    }

    log::debug!(
        "placed {} entities on a ring of radius {:.1}{}",
        n,
        ring,
        if center.is_some() { " around a center" } else { "" }
    );

    placed
}
