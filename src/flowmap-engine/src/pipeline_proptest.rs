// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for the filtering and aggregation stages.

use std::collections::HashSet;

use float_cmp::approx_eq;
use proptest::prelude::*;

use crate::datamodel::{EntityId, Flow, Measure, RenderType};
use crate::pipeline::*;

const ENTITY_COUNT: EntityId = 8;

fn magnitude_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), (0i32..500).prop_map(|x| x as f64)]
}

fn flow_strategy() -> impl Strategy<Value = Flow> {
    (
        0..ENTITY_COUNT,
        1..ENTITY_COUNT,
        magnitude_strategy(),
        magnitude_strategy(),
    )
        .prop_map(|(from, step, inflow, outflow)| {
            let to = (from + step) % ENTITY_COUNT;
            Flow::from_in_out(
                from,
                to,
                Measure::new(inflow, 0.0, None),
                Measure::new(outflow, 0.0, None),
            )
        })
}

fn flows_strategy() -> impl Strategy<Value = Vec<Flow>> {
    prop::collection::vec(flow_strategy(), 0..30)
}

fn all_entities() -> Vec<EntityId> {
    (0..ENTITY_COUNT).collect()
}

fn contains_flow(haystack: &[Flow], needle: &Flow) -> bool {
    haystack.iter().any(|f| f == needle)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn raising_threshold_never_adds_flows(
        flows in flows_strategy(),
        low in 0.0f64..100.0,
        bump in 0.0f64..50.0,
    ) {
        let high = (low + bump).min(100.0);
        let at_low = threshold_filter(flows.clone(), low);
        let at_high = threshold_filter(flows, high);
        prop_assert!(at_high.len() <= at_low.len());
        for f in &at_high {
            prop_assert!(contains_flow(&at_low, f));
        }
    }

    #[test]
    fn focus_output_touches_focus(flows in flows_strategy(), focus in 0..ENTITY_COUNT) {
        let focused = focus_filter(flows.clone(), Some(focus));
        prop_assert!(focused.iter().all(|f| f.touches(focus)));
        let expected = flows.iter().filter(|f| f.touches(focus)).count();
        prop_assert_eq!(expected, focused.len());
    }

    #[test]
    fn collapse_leaves_one_flow_per_pair(flows in flows_strategy()) {
        let once = collapse_duplicates(flows.clone());
        let keys: HashSet<_> = once.iter().map(Flow::pair_key).collect();
        prop_assert_eq!(keys.len(), once.len());

        let input_keys: HashSet<_> = flows.iter().map(Flow::pair_key).collect();
        prop_assert_eq!(input_keys, keys);

        let twice = collapse_duplicates(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn aggregation_conserves_volume(flows in flows_strategy()) {
        let center = ENTITY_COUNT;
        let aggregated = aggregate_to_center(&flows, &all_entities(), center);
        prop_assert_eq!(ENTITY_COUNT as usize, aggregated.len());
        prop_assert!(aggregated.iter().all(|f| f.to == center));

        let total_in: f64 = aggregated.iter().map(|f| f.in_magnitude).sum();
        let total_out: f64 = aggregated.iter().map(|f| f.out_magnitude).sum();
        let moved: f64 = flows.iter().map(|f| f.in_magnitude + f.out_magnitude).sum();
        prop_assert!(approx_eq!(f64, total_in, total_out, epsilon = 1e-6));
        prop_assert!(approx_eq!(f64, total_in, moved, epsilon = 1e-6));
    }

    #[test]
    fn bidirectional_shares_sum_to_100(
        flows in flows_strategy(),
        threshold in 0.0f64..100.0,
        center_mode in any::<bool>(),
    ) {
        let params = PipelineParams {
            threshold,
            collapse_duplicates: true,
            center: if center_mode { Some(ENTITY_COUNT) } else { None },
            render_type: RenderType::Bidirectional,
            ..PipelineParams::default()
        };
        let out = run(flows, &all_entities(), &params);
        prop_assert_eq!(out.stats.output, out.flows.len());
        for f in &out.flows {
            let in_share = f.in_share_percent().unwrap_or(f64::NAN);
            let out_share = f.out_share_percent().unwrap_or(f64::NAN);
            prop_assert!((0.0..=100.0).contains(&in_share));
            prop_assert!(approx_eq!(f64, in_share + out_share, 100.0, epsilon = 1e-9));
        }
    }

    #[test]
    fn unidirectional_output_has_no_split(flows in flows_strategy(), focus in 0..ENTITY_COUNT) {
        let params = PipelineParams {
            focus: Some(focus),
            collapse_duplicates: true,
            ..PipelineParams::default()
        };
        let out = run(flows, &all_entities(), &params);
        prop_assert!(out.flows.iter().all(|f| !f.is_bidirectional() && f.touches(focus)));
        prop_assert!(out.stats.after_focus >= out.stats.after_threshold);
        prop_assert!(out.stats.after_threshold >= out.stats.after_collapse);
    }
}
