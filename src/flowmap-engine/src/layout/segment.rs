// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Flow line geometry: where a flow touches its bubbles, where a
//! bidirectional flow splits, and how far its two halves move apart.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::datamodel::{EntityId, Flow, FlowDirection, Measure, NetDirection, Split};

use super::geometry::Position;

/// The part of a placed entity the flow geometry needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bubble {
    pub id: EntityId,
    pub position: Position,
    pub radius: f64,
}

/// Why a flow's geometry couldn't be computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Degenerate {
    SelfReferential,
    NonFiniteInput,
    NonPositiveRadius,
    /// The bubbles coincide or overlap, leaving no room for a line.
    Overlapping,
}

impl Degenerate {
    pub fn describe(self) -> &'static str {
        match self {
            Degenerate::SelfReferential => "flow starts and ends at the same entity",
            Degenerate::NonFiniteInput => "entity position or radius is not finite",
            Degenerate::NonPositiveRadius => "entity radius is not positive",
            Degenerate::Overlapping => "entities overlap, no room for a flow line",
        }
    }
}

/// What a drawn segment carries.  Segments always run from `start` to
/// `end`, so an arrowhead belongs at `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentRole {
    /// Movement from the flow's `to` into its `from`.
    In,
    /// Movement from the flow's `from` into its `to`.
    Out,
    /// The net movement, in whichever direction it points.
    Net,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowSegment {
    pub role: SegmentRole,
    pub start: Position,
    pub end: Position,
    /// Perpendicular displacement already applied to `start` and `end`.
    pub offset: Position,
    pub magnitude: f64,
    pub measure: Measure,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub share_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub index: Option<f64>,
}

/// Fully resolved geometry of one flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowGeometry {
    pub from: EntityId,
    pub to: EntityId,
    pub is_bidirectional: bool,
    pub stroke_width: f64,
    /// Relative size of the displayed magnitude within the visible flows.
    pub emphasis: f64,
    pub percentile_rank: f64,
    /// Boundary-to-boundary centerline, from the `from` bubble to the
    /// `to` bubble, before any offset.
    pub centerline: (Position, Position),
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub split_point: Option<Position>,
    pub segments: SmallVec<[FlowSegment; 2]>,
}

fn check_bubble(b: &Bubble) -> Result<(), Degenerate> {
    if !b.position.is_finite() || !b.radius.is_finite() {
        return Err(Degenerate::NonFiniteInput);
    }
    if b.radius <= 0.0 {
        return Err(Degenerate::NonPositiveRadius);
    }
    Ok(())
}

/// Points where a line from `a` to `b` leaves `a`'s outer ring and
/// reaches `b`'s, `padding` beyond each bubble's edge.
pub fn boundary_points(
    a: &Bubble,
    b: &Bubble,
    padding: f64,
) -> Result<(Position, Position), Degenerate> {
    if a.id == b.id {
        return Err(Degenerate::SelfReferential);
    }
    check_bubble(a)?;
    check_bubble(b)?;
    let padding = if padding.is_finite() { padding.max(0.0) } else { 0.0 };

    let reach_a = a.radius + padding;
    let reach_b = b.radius + padding;
    if a.position.distance(b.position) <= reach_a + reach_b {
        return Err(Degenerate::Overlapping);
    }

    let dir = Position::from_angle(a.position.angle_to(b.position));
    let start = a.position + dir * reach_a;
    let end = b.position - dir * reach_b;
    if !start.is_finite() || !end.is_finite() {
        return Err(Degenerate::NonFiniteInput);
    }
    Ok((start, end))
}

/// Where the inbound share of a bidirectional flow gives way to the
/// outbound share, measured from `start`.
pub fn split_point(start: Position, end: Position, split: &Split) -> Position {
    start.lerp(end, split.in_fraction())
}

/// Displacement for the first half of a bidirectional flow; the second
/// half uses the negation.
///
/// Thicker strokes move further apart.  The sign depends only on which
/// entity id is smaller, so a pair offsets the same way whichever end is
/// `from`.
pub fn parallel_offset(
    start: Position,
    end: Position,
    from: EntityId,
    to: EntityId,
    stroke_width: f64,
    gap: f64,
) -> Option<Position> {
    let normal = (end - start).normalized()?.perpendicular();
    let sign = if from < to { 1.0 } else { -1.0 };
    let distance = stroke_width.max(0.0) / 2.0 + gap.max(0.0) / 2.0;
    Some(normal * (sign * distance))
}

/// Geometry of a flow drawn as a single line.
///
/// The line points the way the displayed quantity moves: `Out` from `from`
/// to `to`, `In` the reverse, and `Net`/`Both` along the net direction.
pub fn unidirectional_segments(
    flow: &Flow,
    direction: FlowDirection,
    start: Position,
    end: Position,
) -> SmallVec<[FlowSegment; 2]> {
    let (role, forward) = match direction {
        FlowDirection::Out => (SegmentRole::Out, true),
        FlowDirection::In => (SegmentRole::In, false),
        FlowDirection::Net | FlowDirection::Both => {
            (SegmentRole::Net, flow.net_direction == NetDirection::Out)
        }
    };
    let (start, end) = if forward { (start, end) } else { (end, start) };
    let measure = flow.measure_for(direction);

    smallvec![FlowSegment {
        role,
        start,
        end,
        offset: Position::default(),
        magnitude: flow.magnitude_for(direction),
        measure,
        share_percent: None,
        index: measure.index,
    }]
}

/// Geometry of a flow drawn as two offset halves meeting at the split
/// point: the inbound half runs from the split back to `from`, the
/// outbound half from the split on to `to`.
pub fn bidirectional_segments(
    flow: &Flow,
    split: &Split,
    start: Position,
    end: Position,
    offset: Position,
) -> (Position, SmallVec<[FlowSegment; 2]>) {
    let at = split_point(start, end, split);

    let inbound = FlowSegment {
        role: SegmentRole::In,
        start: at + offset,
        end: start + offset,
        offset,
        magnitude: flow.in_magnitude,
        measure: flow.inflow,
        share_percent: Some(split.in_share_percent()),
        index: split.in_index.or(flow.inflow.index),
    };
    let outbound = FlowSegment {
        role: SegmentRole::Out,
        start: at - offset,
        end: end - offset,
        offset: -offset,
        magnitude: flow.out_magnitude,
        measure: flow.outflow,
        share_percent: Some(split.out_share_percent()),
        index: split.out_index.or(flow.outflow.index),
    };

    (at, smallvec![inbound, outbound])
}
