// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

pub mod config;
pub mod geometry;
pub mod placement;
pub mod segment;

use std::collections::HashMap;

use crate::common::{Diagnostic, ErrorCode};
use crate::datamodel::{Entity, EntityId, Flow, FlowDirection};
use crate::stats::{lerp_rank, rank_by};

use self::config::{Canvas, LayoutConfig};
use self::geometry::{Rect, calc_bounds};
use self::placement::{CenterEntity, LaidOutEntity, place_entities};
use self::segment::{
    Bubble, FlowGeometry, bidirectional_segments, boundary_points, parallel_offset,
    unidirectional_segments,
};

/// Everything the rendering layer needs to draw one diagram.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Layout {
    pub entities: Vec<LaidOutEntity>,
    pub flows: Vec<FlowGeometry>,
    pub bounds: Option<Rect>,
    pub diagnostics: Vec<Diagnostic>,
}

fn degenerate(flow: &Flow, details: &str) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::DegenerateGeometry,
        Some(flow.from),
        Some(flow.to),
        details.to_owned(),
    )
}

/// Lay out a diagram: place the bubbles, then resolve every flow into
/// drawable segments.
///
/// Stroke widths scale with each flow's percentile rank among `flows` by
/// the magnitude shown for `direction`.  A flow whose geometry can't be
/// computed is left out and reported; it never affects the others.
pub fn generate_layout(
    entities: &[Entity],
    center: Option<&CenterEntity>,
    flows: &[Flow],
    direction: FlowDirection,
    canvas: Canvas,
    config: &LayoutConfig,
) -> Layout {
    let placed = place_entities(entities, center, canvas, config);
    let bubbles: HashMap<EntityId, Bubble> = placed
        .iter()
        .map(|e| {
            (
                e.id,
                Bubble {
                    id: e.id,
                    position: e.position,
                    radius: e.radius,
                },
            )
        })
        .collect();

    let ranked = rank_by(flows, |f| f.magnitude_for(direction));

    let mut geometries = Vec::with_capacity(flows.len());
    let mut diagnostics = Vec::new();

    for r in &ranked {
        let flow = r.item;
        let (Some(a), Some(b)) = (bubbles.get(&flow.from), bubbles.get(&flow.to)) else {
            diagnostics.push(degenerate(flow, "flow refers to an entity that isn't placed"));
            continue;
        };

        let (start, end) = match boundary_points(a, b, config.outer_ring_padding) {
            Ok(points) => points,
            Err(why) => {
                diagnostics.push(degenerate(flow, why.describe()));
                continue;
            }
        };

        let stroke_width = lerp_rank(
            config.min_stroke_width,
            config.max_stroke_width,
            r.percentile_rank,
        );

        let (split_point, segments) = match flow.split {
            Some(ref split) => {
                let Some(offset) = parallel_offset(
                    start,
                    end,
                    flow.from,
                    flow.to,
                    stroke_width,
                    config.parallel_gap,
                ) else {
                    diagnostics.push(degenerate(flow, "flow line has no length"));
                    continue;
                };
                let (at, segments) = bidirectional_segments(flow, split, start, end, offset);
                (Some(at), segments)
            }
            None => (None, unidirectional_segments(flow, direction, start, end)),
        };

        if segments
            .iter()
            .any(|s| !s.start.is_finite() || !s.end.is_finite())
        {
            diagnostics.push(degenerate(flow, "flow segment is not finite"));
            continue;
        }

        geometries.push(FlowGeometry {
            from: flow.from,
            to: flow.to,
            is_bidirectional: flow.is_bidirectional(),
            stroke_width,
            emphasis: r.relative_size,
            percentile_rank: r.percentile_rank,
            centerline: (start, end),
            split_point,
            segments,
        });
    }

    let bounds = calc_bounds(placed.iter().map(LaidOutEntity::bounds));

    Layout {
        entities: placed,
        flows: geometries,
        bounds,
        diagnostics,
    }
}
