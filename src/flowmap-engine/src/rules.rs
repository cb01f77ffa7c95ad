// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Table-driven choice between one-line and two-line flow rendering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::datamodel::{FlowDirection, RenderType};

/// When a rule applies.  An absent set matches anything.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleCondition {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metrics: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub flow_directions: Option<BTreeSet<FlowDirection>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub views: Option<BTreeSet<String>>,
}

impl RuleCondition {
    pub fn matches(&self, view: &str, direction: FlowDirection, metric: &str) -> bool {
        self.metrics.as_ref().is_none_or(|m| m.contains(metric))
            && self
                .flow_directions
                .as_ref()
                .is_none_or(|d| d.contains(&direction))
            && self.views.as_ref().is_none_or(|v| v.contains(view))
    }

    pub fn with_metrics(mut self, metrics: &[&str]) -> Self {
        self.metrics = Some(metrics.iter().map(|m| (*m).to_owned()).collect());
        self
    }

    pub fn with_flow_directions(mut self, directions: &[FlowDirection]) -> Self {
        self.flow_directions = Some(directions.iter().copied().collect());
        self
    }

    pub fn with_views(mut self, views: &[&str]) -> Self {
        self.views = Some(views.iter().map(|v| (*v).to_owned()).collect());
        self
    }
}

#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderingRule {
    #[serde(default)]
    pub condition: RuleCondition,
    pub render_type: RenderType,
    #[serde(default)]
    pub priority: i32,
}

impl RenderingRule {
    pub fn new(condition: RuleCondition, render_type: RenderType, priority: i32) -> Self {
        RenderingRule {
            condition,
            render_type,
            priority,
        }
    }
}

/// A view's rules, ordered once by descending priority.
///
/// The sort is stable, so rules of equal priority keep their declaration
/// order and the first declared wins.
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<RenderingRule>", into = "Vec<RenderingRule>")]
pub struct RuleSet {
    rules: Vec<RenderingRule>,
}

impl From<Vec<RenderingRule>> for RuleSet {
    fn from(rules: Vec<RenderingRule>) -> Self {
        RuleSet::new(rules)
    }
}

impl From<RuleSet> for Vec<RenderingRule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

impl RuleSet {
    pub fn new(mut rules: Vec<RenderingRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        RuleSet { rules }
    }

    pub fn rules(&self) -> &[RenderingRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule that decides for this combination, if any matches.
    pub fn matching_rule(
        &self,
        view: &str,
        direction: FlowDirection,
        metric: &str,
    ) -> Option<&RenderingRule> {
        self.rules
            .iter()
            .find(|rule| rule.condition.matches(view, direction, metric))
    }

    pub fn resolve(&self, view: &str, direction: FlowDirection, metric: &str) -> RenderType {
        self.matching_rule(view, direction, metric)
            .map(|rule| rule.render_type)
            .unwrap_or_default()
    }
}
