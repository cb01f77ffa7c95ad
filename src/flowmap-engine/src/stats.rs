// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Relative-size and percentile-rank statistics.
//!
//! Every visual encoding in the diagram (bubble radius, stroke width,
//! emphasis) is scaled from these two numbers, so both functions are
//! total: empty and single-item inputs produce well-defined results and
//! non-finite values never leak into the output.

use ordered_float::OrderedFloat;

/// An item paired with its relative size, in percent of the collection's
/// value range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaled<'a, T> {
    pub item: &'a T,
    pub value: f64,
    pub relative_size: f64,
}

/// An item paired with both its relative size and its percentile rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ranked<'a, T> {
    pub item: &'a T,
    pub value: f64,
    pub relative_size: f64,
    pub percentile_rank: f64,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Compute `(value - min) / (max - min) * 100` for every item.
///
/// When every value is equal (which includes a single item) each item gets
/// 100.  The input is only borrowed; the derived field lives on the
/// returned wrappers.
pub fn relative_size_percent<'a, T, F>(items: &'a [T], key: F) -> Vec<Scaled<'a, T>>
where
    F: Fn(&T) -> f64,
{
    let values: Vec<f64> = items.iter().map(|item| finite_or_zero(key(item))).collect();

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    items
        .iter()
        .zip(values)
        .map(|(item, value)| {
            let relative_size = if range > 0.0 {
                (value - min) / range * 100.0
            } else {
                100.0
            };
            Scaled {
                item,
                value,
                relative_size,
            }
        })
        .collect()
}

/// Rank each item by the number of items whose relative size is strictly
/// smaller, scaled to `rank / (n - 1) * 100`.
///
/// Equal values share a rank.  Collections of zero or one item rank
/// every item at 100.
pub fn percentile_rank<'a, T>(items: &[Scaled<'a, T>]) -> Vec<Ranked<'a, T>> {
    let n = items.len();
    if n <= 1 {
        return items
            .iter()
            .map(|s| Ranked {
                item: s.item,
                value: s.value,
                relative_size: s.relative_size,
                percentile_rank: 100.0,
            })
            .collect();
    }

    let mut sorted: Vec<OrderedFloat<f64>> =
        items.iter().map(|s| OrderedFloat(s.relative_size)).collect();
    sorted.sort();

    let denominator = (n - 1) as f64;
    items
        .iter()
        .map(|s| {
            let below = sorted.partition_point(|v| *v < OrderedFloat(s.relative_size));
            Ranked {
                item: s.item,
                value: s.value,
                relative_size: s.relative_size,
                percentile_rank: below as f64 / denominator * 100.0,
            }
        })
        .collect()
}

/// Convenience for the common case of ranking items by a single key.
pub fn rank_by<'a, T, F>(items: &'a [T], key: F) -> Vec<Ranked<'a, T>>
where
    F: Fn(&T) -> f64,
{
    percentile_rank(&relative_size_percent(items, key))
}

/// Linear interpolation between `min` and `max` by a 0..100 rank.
pub fn lerp_rank(min: f64, max: f64, rank: f64) -> f64 {
    let t = (finite_or_zero(rank) / 100.0).clamp(0.0, 1.0);
    min + (max - min) * t
}

/// Square-root interpolation between `min` and `max` by a 0..100 rank.
///
/// Used for bubble radii so the perceived area tracks the rank more evenly
/// than a linear radius would.
pub fn lerp_sqrt_rank(min: f64, max: f64, rank: f64) -> f64 {
    let t = (finite_or_zero(rank) / 100.0).clamp(0.0, 1.0);
    min + (max - min) * t.sqrt()
}
