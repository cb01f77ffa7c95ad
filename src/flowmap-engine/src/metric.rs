// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Metric normalization: raw per-metric payloads to canonical [`Flow`]s.
//!
//! Each metric declares the shape of its payload, and each shape has
//! exactly one parser.  There is no "try this field, then that one"
//! fallback: a payload either matches its declared shape or the record is
//! reported and replaced by a zero flow.

use serde::{Deserialize, Serialize};

use crate::common::{Diagnostic, ErrorCode};
use crate::datamodel::{EntityId, Flow, Measure, NetDirection, Split};
use crate::json::{DirectionalNetPayload, InOutPayload, MoreLessPayload, RawBoth, RawRelationship};

/// The payload layout a metric publishes.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricShape {
    /// `in`/`out`/`net`, where `net` is authoritative (churn, switching).
    DirectionalNet,
    /// `more`/`less`; direction follows the larger side (spend).
    MoreLess,
    /// `in`/`out` only; net is the derived difference.
    InOut,
}

#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub shape: MetricShape,
}

impl MetricDefinition {
    pub fn new(name: &str, shape: MetricShape) -> Self {
        MetricDefinition {
            name: name.to_owned(),
            shape,
        }
    }
}

/// Flows produced from one relationship list, plus whatever went wrong
/// along the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Normalized {
    pub flows: Vec<Flow>,
    pub diagnostics: Vec<Diagnostic>,
}

fn split_from(both: Option<RawBoth>, in_magnitude: f64, out_magnitude: f64) -> Split {
    match both {
        Some(both) if both.in_percent.abs() + both.out_percent.abs() > 0.0 => {
            Split::from_weights(both.in_percent, both.out_percent)
                .with_indices(both.in_index, both.out_index)
        }
        Some(both) => Split::from_weights(in_magnitude, out_magnitude)
            .with_indices(both.in_index, both.out_index),
        None => Split::from_weights(in_magnitude, out_magnitude),
    }
}

fn directional_net_flow(from: EntityId, to: EntityId, p: DirectionalNetPayload) -> Flow {
    let inflow = Measure::from(p.inflow);
    let outflow = Measure::from(p.outflow);
    let net = Measure::from(p.net);
    let in_magnitude = inflow.abs.abs();
    let out_magnitude = outflow.abs.abs();

    Flow {
        from,
        to,
        in_magnitude,
        out_magnitude,
        // the published net wins over in - out
        net_magnitude: net.abs.abs(),
        net_direction: if net.abs >= 0.0 {
            NetDirection::In
        } else {
            NetDirection::Out
        },
        inflow,
        outflow,
        net,
        split: Some(split_from(p.both, in_magnitude, out_magnitude)),
    }
}

fn more_less_flow(from: EntityId, to: EntityId, p: MoreLessPayload) -> Flow {
    let more = Measure::from(p.more);
    let less = Measure::from(p.less);
    let in_magnitude = more.abs.abs();
    let out_magnitude = less.abs.abs();

    Flow {
        from,
        to,
        in_magnitude,
        out_magnitude,
        net_magnitude: (in_magnitude - out_magnitude).abs(),
        net_direction: if in_magnitude >= out_magnitude {
            NetDirection::In
        } else {
            NetDirection::Out
        },
        inflow: more,
        outflow: less,
        net: Measure::new(
            in_magnitude - out_magnitude,
            more.percent - less.percent,
            None,
        ),
        split: Some(split_from(p.both, in_magnitude, out_magnitude)),
    }
}

fn in_out_flow(from: EntityId, to: EntityId, p: InOutPayload) -> Flow {
    let mut flow = Flow::from_in_out(from, to, p.inflow.into(), p.outflow.into());
    flow.split = Some(split_from(p.both, flow.in_magnitude, flow.out_magnitude));
    flow
}

/// Normalize a single record for `metric`.
///
/// `hub` is the implicit other side for hub/spoke sources; records that
/// name a `to` explicitly keep it.  On failure the returned diagnostic
/// describes the record, and the caller decides what stands in for it.
pub fn normalize_record(
    record: &RawRelationship,
    metric: &MetricDefinition,
    hub: Option<EntityId>,
) -> Result<Flow, Diagnostic> {
    let from = record.from;
    let Some(to) = record.to.or(hub) else {
        return Err(Diagnostic::new(
            ErrorCode::MalformedMetricRecord,
            Some(from),
            None,
            "relationship has no `to` entity and the data source has no hub".to_owned(),
        ));
    };

    let Some(value) = record.metrics.get(&metric.name) else {
        return Err(Diagnostic::new(
            ErrorCode::MalformedMetricRecord,
            Some(from),
            Some(to),
            format!("no `{}` data", metric.name),
        ));
    };

    let parsed = match metric.shape {
        MetricShape::DirectionalNet => {
            DirectionalNetPayload::deserialize(value).map(|p| directional_net_flow(from, to, p))
        }
        MetricShape::MoreLess => {
            MoreLessPayload::deserialize(value).map(|p| more_less_flow(from, to, p))
        }
        MetricShape::InOut => InOutPayload::deserialize(value).map(|p| in_out_flow(from, to, p)),
    };

    parsed.map_err(|err| {
        Diagnostic::new(
            ErrorCode::MalformedMetricRecord,
            Some(from),
            Some(to),
            format!("bad `{}` data: {}", metric.name, err),
        )
    })
}

/// Normalize every record of a relationship list.
///
/// A record that can't be read becomes a zero flow between the same
/// entities (or is dropped when even its endpoints are unknown) and the
/// rest of the batch carries on.
pub fn normalize_all(
    records: &[RawRelationship],
    metric: &MetricDefinition,
    hub: Option<EntityId>,
) -> Normalized {
    let mut out = Normalized {
        flows: Vec::with_capacity(records.len()),
        diagnostics: Vec::new(),
    };

    for record in records {
        match normalize_record(record, metric, hub) {
            Ok(flow) => out.flows.push(flow),
            Err(diagnostic) => {
                if let (Some(from), Some(to)) = (diagnostic.from, diagnostic.to) {
                    out.flows.push(Flow::zero(from, to));
                }
                out.diagnostics.push(diagnostic);
            }
        }
    }

    log::debug!(
        "normalized {} `{}` records ({} malformed)",
        records.len(),
        metric.name,
        out.diagnostics.len()
    );

    out
}
