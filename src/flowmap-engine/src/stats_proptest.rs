// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for relative sizing and percentile ranking.

use proptest::prelude::*;

use crate::stats::*;

fn value_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        (0i32..10_000).prop_map(|x| x as f64),
        (-1000i32..1000).prop_map(|x| x as f64 / 8.0),
    ]
}

fn values_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(value_strategy(), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn relative_size_is_bounded(values in values_strategy()) {
        let scaled = relative_size_percent(&values, |v| *v);
        prop_assert_eq!(values.len(), scaled.len());
        for s in &scaled {
            prop_assert!((0.0..=100.0).contains(&s.relative_size));
        }
        if !values.is_empty() {
            let largest = scaled
                .iter()
                .map(|s| s.relative_size)
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(100.0, largest);
        }
    }

    #[test]
    fn percentile_rank_is_bounded_and_ordered(values in values_strategy()) {
        let ranked = rank_by(&values, |v| *v);
        prop_assert_eq!(values.len(), ranked.len());

        for (r, v) in ranked.iter().zip(&values) {
            prop_assert!(std::ptr::eq(r.item, v));
            prop_assert!((0.0..=100.0).contains(&r.percentile_rank));
        }

        for a in &ranked {
            for b in &ranked {
                if a.value < b.value {
                    prop_assert!(a.percentile_rank <= b.percentile_rank);
                }
                if a.value == b.value {
                    prop_assert_eq!(a.percentile_rank, b.percentile_rank);
                }
            }
        }
    }

    #[test]
    fn smallest_value_ranks_zero(values in prop::collection::vec(value_strategy(), 2..40)) {
        let ranked = rank_by(&values, |v| *v);
        let smallest = ranked
            .iter()
            .map(|r| r.percentile_rank)
            .fold(f64::INFINITY, f64::min);
        prop_assert_eq!(0.0, smallest);
    }

    #[test]
    fn lerp_stays_within_range(rank in -50.0f64..150.0, min in 0.0f64..20.0, span in 0.0f64..50.0) {
        let max = min + span;
        let linear = lerp_rank(min, max, rank);
        let sqrt = lerp_sqrt_rank(min, max, rank);
        prop_assert!(linear >= min - 1e-9 && linear <= max + 1e-9);
        prop_assert!(sqrt >= min - 1e-9 && sqrt <= max + 1e-9);
    }
}
