// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use float_cmp::approx_eq;

use flowmap_engine::layout::segment::SegmentRole;
use flowmap_engine::{
    Dataset, Diagram, Engine, ErrorCode, FlowDirection, LayoutConfig, RenderParams, RenderType,
    ViewRegistry,
};

fn brands() -> Dataset {
    Dataset::from_json(include_str!("fixtures/brands.json"))
        .unwrap_or_else(|e| panic!("failed to parse brands fixture: {e}"))
}

fn categories() -> Dataset {
    Dataset::from_json(include_str!("fixtures/categories.json"))
        .unwrap_or_else(|e| panic!("failed to parse categories fixture: {e}"))
}

fn render(dataset: &Dataset, params: &RenderParams) -> Diagram {
    Engine::default()
        .render(dataset, params)
        .unwrap_or_else(|e| panic!("render of `{}` failed: {e}", params.view))
}

fn flow_pairs(diagram: &Diagram) -> Vec<(u32, u32)> {
    let mut pairs: Vec<_> = diagram.flows.iter().map(|f| (f.from, f.to)).collect();
    pairs.sort();
    pairs
}

/// Checks that hold for every diagram the engine produces.
fn verify_diagram(diagram: &Diagram, label: &str) {
    let bounds = diagram
        .bounds
        .unwrap_or_else(|| panic!("{label}: diagram with entities should have bounds"));
    for e in &diagram.entities {
        assert!(e.position.is_finite(), "{label}: entity {} not finite", e.id);
        assert!(e.radius > 0.0, "{label}: entity {} has no radius", e.id);
        assert!(e.position.x - e.radius >= bounds.left - 1e-9, "{label}");
        assert!(e.position.x + e.radius <= bounds.right + 1e-9, "{label}");
        assert!(e.position.y - e.radius >= bounds.top - 1e-9, "{label}");
        assert!(e.position.y + e.radius <= bounds.bottom + 1e-9, "{label}");
    }

    for f in &diagram.flows {
        assert!(f.stroke_width > 0.0, "{label}: flow {}->{}", f.from, f.to);
        assert!((0.0..=100.0).contains(&f.percentile_rank), "{label}");
        let expected_segments = if f.is_bidirectional { 2 } else { 1 };
        assert_eq!(expected_segments, f.segments.len(), "{label}");
        for s in &f.segments {
            assert!(s.start.is_finite() && s.end.is_finite(), "{label}");
        }
        if let Some(share) = f.segments.first().and_then(|s| s.share_percent) {
            let other = f.segments[1].share_percent.unwrap_or(f64::NAN);
            assert!(approx_eq!(f64, share + other, 100.0, epsilon = 1e-9), "{label}");
        }
    }

    // the engine never returns two flows for the same unordered pair
    let mut keys: Vec<_> = diagram
        .flows
        .iter()
        .map(|f| (f.from.min(f.to), f.from.max(f.to)))
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), diagram.flows.len(), "{label}: duplicate pair");
}

#[test]
fn brand_churn_defaults() {
    let diagram = render(&brands(), &RenderParams::new("brand_churn"));
    verify_diagram(&diagram, "brand_churn");

    assert_eq!("churn", diagram.metric);
    assert_eq!(FlowDirection::Net, diagram.flow_direction);
    assert_eq!(RenderType::Unidirectional, diagram.render_type);
    assert_eq!(4, diagram.entities.len());
    assert!(diagram.entities.iter().all(|e| !e.is_center));

    // (1, 0) is the smaller duplicate of (0, 1)
    assert_eq!(vec![(0, 1), (0, 2), (1, 3), (2, 3)], flow_pairs(&diagram));
    assert_eq!(5, diagram.stats.input);
    assert_eq!(4, diagram.stats.after_collapse);

    // the unreadable `churn` payload on 2->3 is reported and drawn as zero
    assert_eq!(1, diagram.diagnostics.len());
    let d = &diagram.diagnostics[0];
    assert_eq!(ErrorCode::MalformedMetricRecord, d.code);
    assert_eq!((Some(2), Some(3)), (d.from, d.to));
    let zero = diagram
        .flows
        .iter()
        .find(|f| (f.from, f.to) == (2, 3))
        .unwrap();
    assert!(approx_eq!(f64, zero.segments[0].magnitude, 0.0));
}

#[test]
fn brand_churn_net_follows_published_direction() {
    let diagram = render(&brands(), &RenderParams::new("brand_churn"));
    let acme = &diagram.entities[0];
    let globex = &diagram.entities[1];

    // net is -18: movement is from Acme into Globex
    let f = diagram
        .flows
        .iter()
        .find(|f| (f.from, f.to) == (0, 1))
        .unwrap();
    let seg = &f.segments[0];
    assert_eq!(SegmentRole::Net, seg.role);
    assert!(approx_eq!(f64, seg.magnitude, 18.0));
    assert!(seg.start.distance(acme.position) < seg.start.distance(globex.position));

    // it is also the largest flow
    assert!(approx_eq!(f64, f.stroke_width, LayoutConfig::default().max_stroke_width));
}

#[test]
fn brand_churn_both_is_bidirectional() {
    let mut params = RenderParams::new("brand_churn");
    params.flow_direction = Some(FlowDirection::Both);
    let diagram = render(&brands(), &params);
    verify_diagram(&diagram, "brand_churn both");

    assert_eq!(RenderType::Bidirectional, diagram.render_type);
    assert!(diagram.flows.iter().all(|f| f.is_bidirectional));

    let f = diagram
        .flows
        .iter()
        .find(|f| (f.from, f.to) == (0, 1))
        .unwrap();
    let inbound = &f.segments[0];
    let outbound = &f.segments[1];
    assert_eq!(SegmentRole::In, inbound.role);
    assert_eq!(SegmentRole::Out, outbound.role);
    assert!(approx_eq!(f64, inbound.share_percent.unwrap(), 30.0));
    assert!(approx_eq!(f64, outbound.share_percent.unwrap(), 70.0));
    assert_eq!(Some(140.0), outbound.index);

    let (start, end) = f.centerline;
    let at = f.split_point.unwrap();
    assert!(approx_eq!(
        f64,
        start.distance(at) / start.distance(end),
        0.3,
        epsilon = 1e-9
    ));

    // no `both` block: split comes from in/out magnitudes
    let f = diagram
        .flows
        .iter()
        .find(|f| (f.from, f.to) == (1, 3))
        .unwrap();
    assert!(approx_eq!(
        f64,
        f.segments[0].share_percent.unwrap(),
        100.0 / 3.0,
        epsilon = 1e-9
    ));
}

#[test]
fn switching_overrides_both_rule() {
    let mut params = RenderParams::new("brand_churn");
    params.metric = Some("switching".to_owned());
    params.flow_direction = Some(FlowDirection::Both);
    let diagram = render(&brands(), &params);
    verify_diagram(&diagram, "switching both");

    assert_eq!(RenderType::Unidirectional, diagram.render_type);
    assert!(diagram.flows.iter().all(|f| !f.is_bidirectional));
    // only two records publish switching
    assert_eq!(3, diagram.diagnostics.len());
}

#[test]
fn threshold_runs_before_collapse() {
    let mut params = RenderParams::new("brand_churn");
    params.threshold = 50.0;
    let diagram = render(&brands(), &params);

    // peaks are 30, 8, 20, 0 and 6: only 30 and 20 reach 15
    assert_eq!(vec![(0, 1), (0, 2)], flow_pairs(&diagram));
    assert_eq!(2, diagram.stats.after_threshold);
}

#[test]
fn focus_keeps_touching_flows() {
    let mut params = RenderParams::new("brand_churn");
    params.focus = Some(3);
    let diagram = render(&brands(), &params);

    assert_eq!(vec![(1, 3), (2, 3)], flow_pairs(&diagram));
    // every entity is still placed
    assert_eq!(4, diagram.entities.len());
}

#[test]
fn center_mode_totals_every_entity() {
    let mut params = RenderParams::new("brand_churn");
    params.center_mode = true;
    let diagram = render(&brands(), &params);
    verify_diagram(&diagram, "center mode");

    assert!(diagram.stats.aggregated);
    assert_eq!(5, diagram.entities.len());
    let center = &diagram.entities[4];
    assert!(center.is_center);
    assert_eq!(4, center.id);
    assert_eq!("All brands", center.label);

    assert_eq!(vec![(0, 4), (1, 4), (2, 4), (3, 4)], flow_pairs(&diagram));

    // Acme: 12 + 20 in as `from`, 30 + 10 out
    let acme = &diagram.flows.iter().find(|f| f.from == 0).unwrap().segments[0];
    assert!(approx_eq!(f64, acme.magnitude, 8.0));
    assert_eq!(SegmentRole::Net, acme.role);
}

#[test]
fn center_mode_totals_respect_threshold() {
    let mut params = RenderParams::new("brand_churn");
    params.center_mode = true;
    params.threshold = 90.0;
    let diagram = render(&brands(), &params);
    verify_diagram(&diagram, "center mode threshold");

    // only 0->1 (peak 30) reaches 27
    assert_eq!(1, diagram.stats.after_threshold);
    assert_eq!(vec![(0, 4), (1, 4), (2, 4), (3, 4)], flow_pairs(&diagram));

    let acme = &diagram.flows.iter().find(|f| f.from == 0).unwrap().segments[0];
    assert!(approx_eq!(f64, acme.magnitude, 18.0));
    let umbrella = &diagram.flows.iter().find(|f| f.from == 3).unwrap().segments[0];
    assert!(approx_eq!(f64, umbrella.magnitude, 0.0));
}

#[test]
fn category_spend_hub() {
    let diagram = render(&categories(), &RenderParams::new("category_spend"));
    verify_diagram(&diagram, "category_spend");

    assert_eq!("spend", diagram.metric);
    assert_eq!(FlowDirection::Both, diagram.flow_direction);
    assert_eq!(RenderType::Bidirectional, diagram.render_type);
    assert!(diagram.diagnostics.is_empty());

    assert_eq!(4, diagram.entities.len());
    let hub = &diagram.entities[3];
    assert!(hub.is_center);
    assert_eq!("Category", hub.label);
    assert!(approx_eq!(f64, hub.magnitude, 120.0));

    assert_eq!(vec![(0, 3), (1, 3), (2, 3)], flow_pairs(&diagram));
    let shares: Vec<f64> = diagram
        .flows
        .iter()
        .map(|f| f.segments[0].share_percent.unwrap())
        .collect();
    // explicit both block, then magnitudes 2/8, then an even 10/10
    assert!(approx_eq!(f64, shares[0], 75.0));
    assert!(approx_eq!(f64, shares[1], 20.0));
    assert!(approx_eq!(f64, shares[2], 50.0));
}

#[test]
fn category_spend_net() {
    let mut params = RenderParams::new("category_spend");
    params.flow_direction = Some(FlowDirection::Net);
    let diagram = render(&categories(), &params);

    assert_eq!(RenderType::Unidirectional, diagram.render_type);
    let magnitudes: Vec<f64> = diagram
        .flows
        .iter()
        .map(|f| f.segments[0].magnitude)
        .collect();
    assert_eq!(vec![10.0, 6.0, 0.0], magnitudes);
}

#[test]
fn configuration_errors() {
    let engine = Engine::default();

    let err = engine
        .render(&brands(), &RenderParams::new("no_such_view"))
        .unwrap_err();
    assert_eq!(ErrorCode::UnknownView, err.code);

    let mut params = RenderParams::new("brand_churn");
    params.metric = Some("spend".to_owned());
    let err = engine.render(&brands(), &params).unwrap_err();
    assert_eq!(ErrorCode::UnknownMetric, err.code);

    let mut params = RenderParams::new("category_spend");
    params.flow_direction = Some(FlowDirection::In);
    let err = engine.render(&categories(), &params).unwrap_err();
    assert_eq!(ErrorCode::UnsupportedFlowDirection, err.code);

    let mut params = RenderParams::new("brand_churn");
    params.threshold = f64::NAN;
    let err = engine.render(&brands(), &params).unwrap_err();
    assert_eq!(ErrorCode::InvalidThreshold, err.code);
}

#[test]
fn render_is_deterministic() {
    let mut params = RenderParams::new("brand_churn");
    params.flow_direction = Some(FlowDirection::Both);
    let a = render(&brands(), &params);
    let b = render(&brands(), &params);
    assert_eq!(a, b);
}

#[test]
fn custom_registry() {
    let registry = ViewRegistry::from_json(
        r#"{
            "metrics": [{"name": "visits", "shape": "in_out"}],
            "views": [{
                "id": "site_traffic",
                "data_source_key": "site_pairs",
                "supported_flow_directions": ["in", "out", "both"],
                "supported_metrics": ["visits"],
                "default_flow_direction": "both",
                "default_metric": "visits",
                "rules": [
                    {"condition": {"flow_directions": ["both"]}, "render_type": "bidirectional"}
                ]
            }]
        }"#,
    )
    .unwrap();

    let dataset = Dataset::from_json(
        r#"{
            "entities": [
                {"id": 0, "label": "home"},
                {"id": 1, "label": "pricing"}
            ],
            "relationships": {
                "site_pairs": [
                    {"from": 0, "to": 1, "metrics": {"visits": {"in": {"abs": 40}, "out": {"abs": 160}}}}
                ]
            }
        }"#,
    )
    .unwrap();

    let engine = Engine::new(&registry, LayoutConfig::default());
    let diagram = engine
        .render(&dataset, &RenderParams::new("site_traffic"))
        .unwrap();
    verify_diagram(&diagram, "custom registry");
    assert_eq!(RenderType::Bidirectional, diagram.render_type);
    assert_eq!(1, diagram.flows.len());
    assert!(approx_eq!(
        f64,
        diagram.flows[0].segments[0].share_percent.unwrap(),
        20.0
    ));

    let err = engine
        .render(&dataset, &RenderParams::new("brand_churn"))
        .unwrap_err();
    assert_eq!(ErrorCode::UnknownView, err.code);
}
