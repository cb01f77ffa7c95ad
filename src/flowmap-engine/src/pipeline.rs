// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Filtering and aggregation of a normalized flow set.
//!
//! Stages always run in the same order: focus, threshold, duplicate
//! collapse, then (optionally) center aggregation over what is left.  The threshold is a
//! percentage of the largest flow still present after focusing, so moving
//! it ahead of the focus filter would change which flows survive.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::datamodel::{EntityId, Flow, Measure, NetDirection, RenderType, Split};

/// Parameters for one pipeline run.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PipelineParams {
    pub focus: Option<EntityId>,
    /// Minimum size, in percent of the largest flow, a flow needs to stay.
    pub threshold: f64,
    /// Collapse flows that connect the same pair of entities.  Only
    /// meaningful for entity-pair sources.
    pub collapse_duplicates: bool,
    /// When set, replace the flow set by per-entity totals against this
    /// center entity.
    pub center: Option<EntityId>,
    pub render_type: RenderType,
}

/// How many flows each stage let through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub input: usize,
    pub after_focus: usize,
    pub after_threshold: usize,
    pub after_collapse: usize,
    pub aggregated: bool,
    pub output: usize,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PipelineOutput {
    pub flows: Vec<Flow>,
    pub stats: PipelineStats,
}

/// Keep only flows that touch `focus`.
pub fn focus_filter(flows: Vec<Flow>, focus: Option<EntityId>) -> Vec<Flow> {
    match focus {
        Some(id) => flows.into_iter().filter(|f| f.touches(id)).collect(),
        None => flows,
    }
}

/// Drop flows whose peak magnitude is below `threshold` percent of the
/// largest peak magnitude in `flows`.
///
/// The threshold is clamped to 0..=100.  When every flow is zero nothing
/// is dropped.
pub fn threshold_filter(flows: Vec<Flow>, threshold: f64) -> Vec<Flow> {
    let threshold = if threshold.is_nan() {
        0.0
    } else {
        threshold.clamp(0.0, 100.0)
    };
    if threshold <= 0.0 {
        return flows;
    }

    let set_max = flows
        .iter()
        .map(Flow::peak_magnitude)
        .fold(0.0_f64, f64::max);
    if set_max <= 0.0 {
        return flows;
    }

    flows
        .into_iter()
        .filter(|f| f.peak_magnitude() / set_max * 100.0 >= threshold)
        .collect()
}

/// Keep one flow per unordered entity pair: the one with the largest peak
/// magnitude, or the first seen on a tie.  Output keeps first-seen order.
pub fn collapse_duplicates(flows: Vec<Flow>) -> Vec<Flow> {
    let mut slot_for_pair: HashMap<(EntityId, EntityId), usize> = HashMap::new();
    let mut kept: Vec<Flow> = Vec::with_capacity(flows.len());

    for flow in flows {
        let key = flow.pair_key();
        match slot_for_pair.get(&key) {
            Some(&slot) => {
                if flow.peak_magnitude() > kept[slot].peak_magnitude() {
                    kept[slot] = flow;
                }
            }
            None => {
                slot_for_pair.insert(key, kept.len());
                kept.push(flow);
            }
        }
    }

    kept
}

#[derive(Clone, Copy, Default)]
struct Totals {
    inflow: f64,
    outflow: f64,
}

fn percent_of(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

/// Contract the flow graph onto a hub.
///
/// Produces one flow per entity in `entities` (skipping `center` itself)
/// from that entity to `center`.  An entity that is a flow's `from`
/// receives the flow's `in` and sends its `out`; as the flow's `to` it
/// receives the `out` and sends the `in`.  A flow therefore adds the same
/// amount to one entity's inbound total as it adds to the other's outbound
/// total.
pub fn aggregate_to_center(flows: &[Flow], entities: &[EntityId], center: EntityId) -> Vec<Flow> {
    let mut totals: BTreeMap<EntityId, Totals> = entities
        .iter()
        .filter(|&&id| id != center)
        .map(|&id| (id, Totals::default()))
        .collect();

    for flow in flows {
        if let Some(t) = totals.get_mut(&flow.from) {
            t.inflow += flow.in_magnitude;
            t.outflow += flow.out_magnitude;
        }
        if flow.to == flow.from {
            continue;
        }
        if let Some(t) = totals.get_mut(&flow.to) {
            t.inflow += flow.out_magnitude;
            t.outflow += flow.in_magnitude;
        }
    }

    let grand_in: f64 = totals.values().map(|t| t.inflow).sum();
    let grand_out: f64 = totals.values().map(|t| t.outflow).sum();

    entities
        .iter()
        .filter_map(|&id| totals.get(&id).map(|t| (id, *t)))
        .map(|(id, t)| {
            let inflow = Measure::new(t.inflow, percent_of(t.inflow, grand_in), None);
            let outflow = Measure::new(t.outflow, percent_of(t.outflow, grand_out), None);
            let net_abs = t.inflow - t.outflow;
            Flow {
                from: id,
                to: center,
                in_magnitude: t.inflow,
                out_magnitude: t.outflow,
                net_magnitude: net_abs.abs(),
                net_direction: if t.inflow >= t.outflow {
                    NetDirection::In
                } else {
                    NetDirection::Out
                },
                inflow,
                outflow,
                net: Measure::new(net_abs, inflow.percent - outflow.percent, None),
                split: Some(Split::from_weights(t.inflow, t.outflow)),
            }
        })
        .collect()
}

/// Keep or drop each flow's split according to how the view draws flows.
pub fn apply_render_type(flows: Vec<Flow>, render_type: RenderType) -> Vec<Flow> {
    flows
        .into_iter()
        .map(|mut flow| {
            flow.split = match render_type {
                RenderType::Unidirectional => None,
                RenderType::Bidirectional => Some(
                    flow.split
                        .unwrap_or_else(|| Split::from_weights(flow.in_magnitude, flow.out_magnitude)),
                ),
            };
            flow
        })
        .collect()
}

/// Run every stage over `flows`.
///
/// `entities` lists the ids center aggregation produces totals for.  With
/// a center set, the totals are taken over the flows that survived focus,
/// threshold and duplicate collapse.
pub fn run(flows: Vec<Flow>, entities: &[EntityId], params: &PipelineParams) -> PipelineOutput {
    let mut stats = PipelineStats {
        input: flows.len(),
        ..PipelineStats::default()
    };

    let focused = focus_filter(flows, params.focus);
    stats.after_focus = focused.len();

    let visible = threshold_filter(focused, params.threshold);
    stats.after_threshold = visible.len();

    let visible = if params.collapse_duplicates {
        collapse_duplicates(visible)
    } else {
        visible
    };
    stats.after_collapse = visible.len();

    let flows = match params.center {
        Some(center) => {
            stats.aggregated = true;
            aggregate_to_center(&visible, entities, center)
        }
        None => visible,
    };

    let flows = apply_render_type(flows, params.render_type);
    stats.output = flows.len();

    log::debug!(
        "pipeline: {} in, {} focused, {} over threshold, {} after collapse, {} out{}",
        stats.input,
        stats.after_focus,
        stats.after_threshold,
        stats.after_collapse,
        stats.output,
        if stats.aggregated { " (aggregated)" } else { "" }
    );

    PipelineOutput { flows, stats }
}
