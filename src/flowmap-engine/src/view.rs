// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! View configurations and the registry the engine resolves them from.
//!
//! A registry is immutable once built.  Callers pass it to the engine
//! explicitly; there is no "current view" held anywhere.

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::config_err;
use crate::datamodel::{FlowDirection, RenderType};
use crate::metric::{MetricDefinition, MetricShape};
use crate::rules::{RenderingRule, RuleCondition, RuleSet};

/// How a view's relationship list is keyed.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// Each record names both entities.
    #[default]
    EntityPair,
    /// Each record names one entity; the other side is the center hub.
    HubSpoke,
}

fn default_center_label() -> String {
    "Total".to_owned()
}

#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfiguration {
    pub id: String,
    pub data_source_key: String,
    #[serde(default)]
    pub data_source_kind: DataSourceKind,
    pub supported_flow_directions: BTreeSet<FlowDirection>,
    pub supported_metrics: BTreeSet<String>,
    pub default_flow_direction: FlowDirection,
    pub default_metric: String,
    #[serde(default = "default_center_label")]
    pub center_label: String,
    #[serde(default)]
    pub rules: RuleSet,
}

impl ViewConfiguration {
    pub fn supports_metric(&self, metric: &str) -> bool {
        self.supported_metrics.contains(metric)
    }

    pub fn supports_flow_direction(&self, direction: FlowDirection) -> bool {
        self.supported_flow_directions.contains(&direction)
    }
}

/// The fully resolved parameters of one render: which view, which metric,
/// which direction, and how flows are drawn.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    pub view: &'a ViewConfiguration,
    pub metric: &'a MetricDefinition,
    pub flow_direction: FlowDirection,
    pub render_type: RenderType,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    metrics: Vec<MetricDefinition>,
    #[serde(default)]
    views: Vec<ViewConfiguration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewRegistry {
    metrics: BTreeMap<String, MetricDefinition>,
    views: BTreeMap<String, ViewConfiguration>,
}

impl ViewRegistry {
    /// Build a registry, checking that every view only refers to metrics
    /// that are defined and that its defaults are among what it supports.
    pub fn new(metrics: Vec<MetricDefinition>, views: Vec<ViewConfiguration>) -> Result<Self> {
        let metrics: BTreeMap<String, MetricDefinition> = metrics
            .into_iter()
            .map(|m| (m.name.clone(), m))
            .collect();

        let mut by_id = BTreeMap::new();
        for view in views {
            for metric in &view.supported_metrics {
                if !metrics.contains_key(metric) {
                    return config_err!(
                        UnknownMetric,
                        format!("view `{}` supports undefined metric `{}`", view.id, metric)
                    );
                }
            }
            if !view.supports_metric(&view.default_metric) {
                return config_err!(
                    UnknownMetric,
                    format!(
                        "view `{}` defaults to unsupported metric `{}`",
                        view.id, view.default_metric
                    )
                );
            }
            if !view.supports_flow_direction(view.default_flow_direction) {
                return config_err!(
                    UnsupportedFlowDirection,
                    format!(
                        "view `{}` defaults to unsupported direction `{}`",
                        view.id, view.default_flow_direction
                    )
                );
            }
            if by_id.contains_key(&view.id) {
                return config_err!(DuplicateView, view.id);
            }
            by_id.insert(view.id.clone(), view);
        }

        Ok(ViewRegistry {
            metrics,
            views: by_id,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(json)?;
        ViewRegistry::new(file.metrics, file.views)
    }

    pub fn view(&self, id: &str) -> Result<&ViewConfiguration> {
        match self.views.get(id) {
            Some(view) => Ok(view),
            None => config_err!(UnknownView, id.to_owned()),
        }
    }

    pub fn metric(&self, name: &str) -> Result<&MetricDefinition> {
        match self.metrics.get(name) {
            Some(metric) => Ok(metric),
            None => config_err!(UnknownMetric, name.to_owned()),
        }
    }

    pub fn view_ids(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// Decide how flows of `metric` in `direction` are drawn in view
    /// `view_id`.  Unknown or unsupported arguments are errors rather than
    /// a silent default.
    pub fn resolve(
        &self,
        view_id: &str,
        direction: FlowDirection,
        metric: &str,
    ) -> Result<RenderType> {
        Ok(self
            .select(view_id, Some(metric), Some(direction))?
            .render_type)
    }

    /// Resolve a view plus optional metric and direction overrides,
    /// falling back to the view's defaults for whichever is absent.
    pub fn select(
        &self,
        view_id: &str,
        metric: Option<&str>,
        direction: Option<FlowDirection>,
    ) -> Result<Selection<'_>> {
        let view = self.view(view_id)?;

        let metric_name = metric.unwrap_or(view.default_metric.as_str());
        if !view.supports_metric(metric_name) {
            return config_err!(
                UnknownMetric,
                format!("view `{}` has no metric `{}`", view.id, metric_name)
            );
        }
        let metric = self.metric(metric_name)?;

        let flow_direction = direction.unwrap_or(view.default_flow_direction);
        if !view.supports_flow_direction(flow_direction) {
            return config_err!(
                UnsupportedFlowDirection,
                format!("view `{}` has no direction `{}`", view.id, flow_direction)
            );
        }

        let render_type = view.rules.resolve(&view.id, flow_direction, &metric.name);

        Ok(Selection {
            view,
            metric,
            flow_direction,
            render_type,
        })
    }
}

fn directions(list: &[FlowDirection]) -> BTreeSet<FlowDirection> {
    list.iter().copied().collect()
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

fn builtin_registry() -> Result<ViewRegistry> {
    use FlowDirection::*;

    let metrics = vec![
        MetricDefinition::new("churn", MetricShape::DirectionalNet),
        MetricDefinition::new("switching", MetricShape::DirectionalNet),
        MetricDefinition::new("spend", MetricShape::MoreLess),
        MetricDefinition::new("flow", MetricShape::InOut),
    ];

    let both = RuleCondition::default().with_flow_directions(&[Both]);

    let views = vec![
        ViewConfiguration {
            id: "brand_churn".to_owned(),
            data_source_key: "brand_pairs".to_owned(),
            data_source_kind: DataSourceKind::EntityPair,
            supported_flow_directions: directions(&[In, Out, Net, Both]),
            supported_metrics: names(&["churn", "switching"]),
            default_flow_direction: Net,
            default_metric: "churn".to_owned(),
            center_label: "All brands".to_owned(),
            rules: RuleSet::new(vec![
                RenderingRule::new(both.clone(), RenderType::Bidirectional, 10),
                // switching is never split
                RenderingRule::new(
                    both.clone().with_metrics(&["switching"]),
                    RenderType::Unidirectional,
                    20,
                ),
            ]),
        },
        ViewConfiguration {
            id: "category_spend".to_owned(),
            data_source_key: "category_hub".to_owned(),
            data_source_kind: DataSourceKind::HubSpoke,
            supported_flow_directions: directions(&[Net, Both]),
            supported_metrics: names(&["spend"]),
            default_flow_direction: Both,
            default_metric: "spend".to_owned(),
            center_label: "Category".to_owned(),
            rules: RuleSet::new(vec![RenderingRule::new(
                both.clone(),
                RenderType::Bidirectional,
                0,
            )]),
        },
        ViewConfiguration {
            id: "market_flow".to_owned(),
            data_source_key: "market_pairs".to_owned(),
            data_source_kind: DataSourceKind::EntityPair,
            supported_flow_directions: directions(&[In, Out, Net, Both]),
            supported_metrics: names(&["flow"]),
            default_flow_direction: Out,
            default_metric: "flow".to_owned(),
            center_label: "Market".to_owned(),
            rules: RuleSet::new(vec![RenderingRule::new(
                both.with_metrics(&["flow"]).with_views(&["market_flow"]),
                RenderType::Bidirectional,
                1,
            )]),
        },
    ];

    ViewRegistry::new(metrics, views)
}

lazy_static! {
    static ref BUILTIN_VIEWS: ViewRegistry =
        builtin_registry().expect("built-in view table is consistent");
}

/// The views shipped with the engine.
pub fn builtin_views() -> &'static ViewRegistry {
    &BUILTIN_VIEWS
}
