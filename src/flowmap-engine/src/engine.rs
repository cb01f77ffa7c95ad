// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! One render, end to end: select the view, normalize the view's
//! relationships, filter and aggregate them, and lay out the result.
//!
//! An [`Engine`] only borrows immutable configuration, so a single engine
//! can serve any number of renders, including concurrently.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::common::{Diagnostic, ErrorCode, Result};
use crate::datamodel::{EntityId, Flow, FlowDirection, RenderType};
use crate::json::Dataset;
use crate::layout::config::{Canvas, LayoutConfig};
use crate::layout::geometry::Rect;
use crate::layout::placement::{CenterEntity, LaidOutEntity};
use crate::layout::segment::FlowGeometry;
use crate::layout::generate_layout;
use crate::metric::normalize_all;
use crate::pipeline::{self, PipelineParams, PipelineStats};
use crate::view::{DataSourceKind, ViewRegistry, builtin_views};
use crate::{config_err, data_err};

/// The user-controlled parameters of one render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub view: String,
    /// Defaults to the view's default metric.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metric: Option<String>,
    /// Defaults to the view's default direction.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub flow_direction: Option<FlowDirection>,
    /// 0..=100, in percent of the largest visible flow.
    #[serde(default)]
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub focus: Option<EntityId>,
    #[serde(default)]
    pub center_mode: bool,
    #[serde(default)]
    pub canvas: Canvas,
}

impl RenderParams {
    pub fn new(view: &str) -> Self {
        RenderParams {
            view: view.to_owned(),
            metric: None,
            flow_direction: None,
            threshold: 0.0,
            focus: None,
            center_mode: false,
            canvas: Canvas::default(),
        }
    }
}

/// Engine output: a fully laid-out diagram plus what went wrong on the way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub view: String,
    pub metric: String,
    pub flow_direction: FlowDirection,
    pub render_type: RenderType,
    pub entities: Vec<LaidOutEntity>,
    pub flows: Vec<FlowGeometry>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bounds: Option<Rect>,
    pub stats: PipelineStats,
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagram {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Clone, Debug)]
pub struct Engine<'a> {
    views: &'a ViewRegistry,
    config: LayoutConfig,
}

impl Default for Engine<'static> {
    fn default() -> Self {
        Engine::new(builtin_views(), LayoutConfig::default())
    }
}

fn check_entities(dataset: &Dataset) -> Result<()> {
    let mut seen = BTreeSet::new();
    for entity in &dataset.entities {
        if !seen.insert(entity.id) {
            return data_err!(DuplicateEntity, format!("entity id {} appears twice", entity.id));
        }
    }
    Ok(())
}

impl<'a> Engine<'a> {
    pub fn new(views: &'a ViewRegistry, config: LayoutConfig) -> Self {
        Engine { views, config }
    }

    pub fn views(&self) -> &ViewRegistry {
        self.views
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute the diagram for `dataset` under `params`.
    ///
    /// Configuration problems (unknown view, metric or direction, an
    /// out-of-range threshold, a dataset without the view's relationship
    /// list) are errors.  Problems with individual records or flows are
    /// reported in [`Diagram::diagnostics`] and otherwise skipped.
    pub fn render(&self, dataset: &Dataset, params: &RenderParams) -> Result<Diagram> {
        let selection = self.views.select(
            &params.view,
            params.metric.as_deref(),
            params.flow_direction,
        )?;
        let view = selection.view;

        if !(0.0..=100.0).contains(&params.threshold) {
            return config_err!(
                InvalidThreshold,
                format!("threshold {} is outside 0..=100", params.threshold)
            );
        }

        check_entities(dataset)?;

        let Some(records) = dataset.relationships_for(&view.data_source_key) else {
            return config_err!(
                UnknownDataSource,
                format!(
                    "dataset has no `{}` relationships for view `{}`",
                    view.data_source_key, view.id
                )
            );
        };

        let center_id = dataset.entities.len() as EntityId;
        let is_hub_spoke = view.data_source_kind == DataSourceKind::HubSpoke;
        let center = if is_hub_spoke || params.center_mode {
            if dataset.entities.iter().any(|e| e.id == center_id) {
                return data_err!(
                    DuplicateEntity,
                    format!("entity id {center_id} is reserved for the center entity")
                );
            }
            Some(CenterEntity {
                id: center_id,
                label: view.center_label.clone(),
            })
        } else {
            None
        };

        let normalized = normalize_all(
            records,
            selection.metric,
            if is_hub_spoke { Some(center_id) } else { None },
        );
        let mut diagnostics = normalized.diagnostics;

        let known: BTreeSet<EntityId> = dataset
            .entities
            .iter()
            .map(|e| e.id)
            .chain(center.as_ref().map(|c| c.id))
            .collect();
        let (flows, unknown): (Vec<Flow>, Vec<Flow>) = normalized
            .flows
            .into_iter()
            .partition(|f| known.contains(&f.from) && known.contains(&f.to));
        diagnostics.extend(unknown.iter().map(|f| {
            Diagnostic::new(
                ErrorCode::MalformedMetricRecord,
                Some(f.from),
                Some(f.to),
                "relationship refers to an unknown entity".to_owned(),
            )
        }));

        let entity_ids: Vec<EntityId> = dataset.entities.iter().map(|e| e.id).collect();
        let output = pipeline::run(
            flows,
            &entity_ids,
            &PipelineParams {
                focus: params.focus,
                threshold: params.threshold,
                collapse_duplicates: view.data_source_kind == DataSourceKind::EntityPair,
                center: if params.center_mode {
                    Some(center_id)
                } else {
                    None
                },
                render_type: selection.render_type,
            },
        );

        let layout = generate_layout(
            &dataset.entities,
            center.as_ref(),
            &output.flows,
            selection.flow_direction,
            params.canvas,
            &self.config,
        );
        diagnostics.extend(layout.diagnostics);

        log::debug!(
            "rendered view `{}` ({} / {} / {:?}): {} entities, {} flows, {} diagnostics",
            view.id,
            selection.metric.name,
            selection.flow_direction,
            selection.render_type,
            layout.entities.len(),
            layout.flows.len(),
            diagnostics.len()
        );

        Ok(Diagram {
            view: view.id.clone(),
            metric: selection.metric.name.clone(),
            flow_direction: selection.flow_direction,
            render_type: selection.render_type,
            entities: layout.entities,
            flows: layout.flows,
            bounds: layout.bounds,
            stats: output.stats,
            diagnostics,
        })
    }
}
