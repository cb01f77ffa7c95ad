// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Flow processing and layout for bubble-and-flow diagrams.
//!
//! Raw relationship records go through [`metric`] normalization, the
//! [`pipeline`] stages and finally [`layout`]; [`Engine`] ties the three
//! together for a single render.

#![forbid(unsafe_code)]

pub mod common;
pub mod datamodel;
pub mod engine;
pub mod json;
pub mod layout;
pub mod metric;
pub mod pipeline;
pub mod rules;
pub mod stats;
pub mod view;

#[cfg(test)]
mod pipeline_proptest;
#[cfg(test)]
mod stats_proptest;

pub use self::common::{Diagnostic, EntityId, Error, ErrorCode, ErrorKind, Result};
pub use self::datamodel::{Entity, Flow, FlowDirection, RenderType, Split};
pub use self::engine::{Diagram, Engine, RenderParams};
pub use self::json::Dataset;
pub use self::layout::config::{Canvas, LayoutConfig};
pub use self::view::{ViewRegistry, builtin_views};
