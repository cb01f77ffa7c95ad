// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Canonical in-memory records shared by the normalizer, the pipeline and
//! the layout.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use flowmap_core::EntityId;

/// Which side of a relationship the diagram shows.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    In,
    Out,
    Net,
    Both,
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FlowDirection::In => "in",
            FlowDirection::Out => "out",
            FlowDirection::Net => "net",
            FlowDirection::Both => "both",
        };
        write!(f, "{name}")
    }
}

/// Whether a flow is drawn as one line or as two parallel lines.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderType {
    #[default]
    Unidirectional,
    Bidirectional,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetDirection {
    /// Net movement is from `to` into `from`.
    #[default]
    In,
    /// Net movement is from `from` into `to`.
    Out,
}

/// One labelled measurement: absolute value, share in percent and an
/// optional index against a baseline.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Measure {
    pub abs: f64,
    pub percent: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub index: Option<f64>,
}

impl Measure {
    pub fn new(abs: f64, percent: f64, index: Option<f64>) -> Self {
        Measure {
            abs,
            percent,
            index,
        }
    }
}

/// Share of a bidirectional flow that moves in each direction.
///
/// Constructed only through [`Split::from_weights`], which keeps the two
/// shares summing to 100.  Deserialized shares are rescaled the same way.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SplitRecord")]
pub struct Split {
    in_share_percent: f64,
    out_share_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub in_index: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub out_index: Option<f64>,
}

#[derive(Deserialize)]
struct SplitRecord {
    in_share_percent: f64,
    out_share_percent: f64,
    #[serde(default)]
    in_index: Option<f64>,
    #[serde(default)]
    out_index: Option<f64>,
}

impl From<SplitRecord> for Split {
    fn from(record: SplitRecord) -> Self {
        Split::from_weights(record.in_share_percent, record.out_share_percent)
            .with_indices(record.in_index, record.out_index)
    }
}

impl Split {
    /// Build a split from two non-negative weights.  Weights that are both
    /// zero (or not finite) split evenly.
    pub fn from_weights(in_weight: f64, out_weight: f64) -> Self {
        let in_weight = if in_weight.is_finite() { in_weight.abs() } else { 0.0 };
        let out_weight = if out_weight.is_finite() { out_weight.abs() } else { 0.0 };
        let total = in_weight + out_weight;
        let in_share_percent = if total > 0.0 {
            in_weight * 100.0 / total
        } else {
            50.0
        };
        Split {
            in_share_percent,
            out_share_percent: 100.0 - in_share_percent,
            in_index: None,
            out_index: None,
        }
    }

    pub fn with_indices(mut self, in_index: Option<f64>, out_index: Option<f64>) -> Self {
        self.in_index = in_index;
        self.out_index = out_index;
        self
    }

    pub fn in_share_percent(&self) -> f64 {
        self.in_share_percent
    }

    pub fn out_share_percent(&self) -> f64 {
        self.out_share_percent
    }

    /// Fraction of the segment, measured from the `from` end, that belongs
    /// to the inbound share.
    pub fn in_fraction(&self) -> f64 {
        let total = self.in_share_percent + self.out_share_percent;
        if total > 0.0 {
            self.in_share_percent / total
        } else {
            0.5
        }
    }
}

/// Canonical directed relationship between two entities.
///
/// `in_*` values measure movement from `to` into `from`, `out_*` values
/// movement from `from` into `to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub from: EntityId,
    pub to: EntityId,
    pub in_magnitude: f64,
    pub out_magnitude: f64,
    pub net_magnitude: f64,
    pub net_direction: NetDirection,
    pub inflow: Measure,
    pub outflow: Measure,
    pub net: Measure,
    /// Present when the metric carries a directional breakdown.  The
    /// pipeline keeps it only when the view renders bidirectionally.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub split: Option<Split>,
}

impl Flow {
    /// A flow with every magnitude at zero, used in place of a record whose
    /// metric payload couldn't be read.
    pub fn zero(from: EntityId, to: EntityId) -> Self {
        Flow {
            from,
            to,
            in_magnitude: 0.0,
            out_magnitude: 0.0,
            net_magnitude: 0.0,
            net_direction: NetDirection::In,
            inflow: Measure::default(),
            outflow: Measure::default(),
            net: Measure::default(),
            split: None,
        }
    }

    /// Build a flow whose net is the derived difference of `in` and `out`.
    pub fn from_in_out(from: EntityId, to: EntityId, inflow: Measure, outflow: Measure) -> Self {
        let in_magnitude = inflow.abs.abs();
        let out_magnitude = outflow.abs.abs();
        let net_abs = in_magnitude - out_magnitude;
        Flow {
            from,
            to,
            in_magnitude,
            out_magnitude,
            net_magnitude: net_abs.abs(),
            net_direction: if net_abs >= 0.0 {
                NetDirection::In
            } else {
                NetDirection::Out
            },
            inflow,
            outflow,
            net: Measure::new(net_abs, inflow.percent - outflow.percent, None),
            split: None,
        }
    }

    pub fn is_bidirectional(&self) -> bool {
        self.split.is_some()
    }

    pub fn in_share_percent(&self) -> Option<f64> {
        self.split.map(|s| s.in_share_percent())
    }

    pub fn out_share_percent(&self) -> Option<f64> {
        self.split.map(|s| s.out_share_percent())
    }

    /// Largest of the in, out and net magnitudes; the quantity thresholds
    /// and duplicate collapsing compare.
    pub fn peak_magnitude(&self) -> f64 {
        self.in_magnitude
            .max(self.out_magnitude)
            .max(self.net_magnitude)
    }

    /// The magnitude shown for a given flow direction.
    pub fn magnitude_for(&self, direction: FlowDirection) -> f64 {
        match direction {
            FlowDirection::In => self.in_magnitude,
            FlowDirection::Out => self.out_magnitude,
            FlowDirection::Net => self.net_magnitude,
            FlowDirection::Both => {
                if self.is_bidirectional() {
                    self.in_magnitude + self.out_magnitude
                } else {
                    self.net_magnitude
                }
            }
        }
    }

    /// The labelling triple shown for a given flow direction.
    pub fn measure_for(&self, direction: FlowDirection) -> Measure {
        match direction {
            FlowDirection::In => self.inflow,
            FlowDirection::Out => self.outflow,
            FlowDirection::Net | FlowDirection::Both => self.net,
        }
    }

    pub fn touches(&self, id: EntityId) -> bool {
        self.from == id || self.to == id
    }

    /// Order-independent key for the pair of entities this flow connects.
    pub fn pair_key(&self) -> (EntityId, EntityId) {
        (self.from.min(self.to), self.from.max(self.to))
    }
}

/// An input entity as supplied by the data source.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub label: String,
    #[serde(default)]
    pub magnitude: f64,
}
