// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Raw payload shapes as delivered by the data source.
//!
//! The top-level dataset is parsed strictly, but per-metric payloads are
//! kept as untyped JSON until the normalizer asks for a specific metric.
//! That way one malformed relationship only costs that relationship, not
//! the whole load.
//!
//! # Example
//! ```
//! use flowmap_engine::json::Dataset;
//!
//! let dataset = Dataset::from_json(r#"{
//!     "entities": [{"id": 0, "label": "Acme", "magnitude": 12.5}],
//!     "relationships": {}
//! }"#)?;
//! assert_eq!(1, dataset.entities.len());
//! # Ok::<(), flowmap_engine::Error>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::datamodel::{Entity, EntityId, Measure};

fn deserialize_null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    T: Default + serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// One load of raw data: the entities and every relationship list, keyed by
/// data source name.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: BTreeMap<String, Vec<RawRelationship>>,
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Dataset> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn relationships_for(&self, data_source_key: &str) -> Option<&[RawRelationship]> {
        self.relationships.get(data_source_key).map(Vec::as_slice)
    }
}

/// A relationship record.  Hub/spoke sources omit `to`; the other side is
/// the implicit hub.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRelationship {
    pub from: EntityId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub to: Option<EntityId>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    #[cfg_attr(
        feature = "schema",
        schemars(with = "BTreeMap<String, serde_json::Value>")
    )]
    pub metrics: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawMeasure {
    pub abs: f64,
    #[serde(default)]
    pub percent: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub index: Option<f64>,
}

impl From<RawMeasure> for Measure {
    fn from(raw: RawMeasure) -> Self {
        Measure::new(raw.abs, raw.percent, raw.index)
    }
}

/// The `both` block of bidirectional-capable metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBoth {
    #[serde(default)]
    pub in_percent: f64,
    #[serde(default)]
    pub out_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub in_index: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub out_index: Option<f64>,
}

/// Payload of metrics that publish an authoritative `net` (churn, switching).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalNetPayload {
    #[serde(rename = "in")]
    pub inflow: RawMeasure,
    #[serde(rename = "out")]
    pub outflow: RawMeasure,
    pub net: RawMeasure,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub both: Option<RawBoth>,
}

/// Payload of spend-style metrics, where `more`/`less` stand in for in/out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoreLessPayload {
    pub more: RawMeasure,
    pub less: RawMeasure,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub both: Option<RawBoth>,
}

/// Payload of generic flows: in and out only, net is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InOutPayload {
    #[serde(rename = "in")]
    pub inflow: RawMeasure,
    #[serde(rename = "out")]
    pub outflow: RawMeasure,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub both: Option<RawBoth>,
}
