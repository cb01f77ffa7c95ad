// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use serde::{Deserialize, Serialize};

// Re-export all common types from flowmap-core
pub use flowmap_core::common::*;

/// A recoverable, per-item problem found while building a diagram.
///
/// Diagnostics never abort a render; they travel alongside the output so
/// the host can surface them, and each one is also logged at warn level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub to: Option<EntityId>,
    pub details: String,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, from: Option<EntityId>, to: Option<EntityId>, details: String) -> Self {
        let diagnostic = Diagnostic {
            code,
            from,
            to,
            details,
        };
        log::warn!("{diagnostic}");
        diagnostic
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.from, self.to) {
            (Some(from), Some(to)) => write!(f, "{}[{}->{}]: {}", self.code, from, to, self.details),
            (Some(from), None) => write!(f, "{}[{}]: {}", self.code, from, self.details),
            _ => write!(f, "{}: {}", self.code, self.details),
        }
    }
}

// Macros for error creation - these need to stay in flowmap-engine
// as they use crate-local paths

#[macro_export]
macro_rules! config_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Config, ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Config, ErrorCode::$code, None))
    }};
}

#[macro_export]
macro_rules! data_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Data, ErrorCode::$code, Some($str)))
    }};
}

#[test]
fn test_diagnostic_display() {
    let d = Diagnostic {
        code: ErrorCode::MalformedMetricRecord,
        from: Some(2),
        to: Some(5),
        details: "missing `net`".to_owned(),
    };
    assert_eq!("malformed_metric_record[2->5]: missing `net`", d.to_string());

    let d = Diagnostic {
        code: ErrorCode::DegenerateGeometry,
        from: None,
        to: None,
        details: "coincident".to_owned(),
    };
    assert_eq!("degenerate_geometry: coincident", d.to_string());
}

#[test]
fn test_config_err_macro() {
    let result: Result<()> = config_err!(UnknownMetric, "spend".to_owned());
    let err = result.unwrap_err();
    assert_eq!(ErrorKind::Config, err.kind);
    assert_eq!(ErrorCode::UnknownMetric, err.code);
}
