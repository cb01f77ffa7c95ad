// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

use serde::{Deserialize, Serialize};

/// Stable identifier of an entity (bubble).  The synthetic center entity,
/// when present, uses `entity_count` as its id.
pub type EntityId = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnknownView,
    UnknownMetric,
    UnknownDataSource,
    UnsupportedFlowDirection,
    DuplicateView,
    DuplicateEntity,
    InvalidThreshold,
    JsonDeserialization,
    MalformedMetricRecord,
    DegenerateGeometry,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            UnknownView => "unknown_view",
            UnknownMetric => "unknown_metric",
            UnknownDataSource => "unknown_data_source",
            UnsupportedFlowDirection => "unsupported_flow_direction",
            DuplicateView => "duplicate_view",
            DuplicateEntity => "duplicate_entity",
            InvalidThreshold => "invalid_threshold",
            JsonDeserialization => "json_deserialization",
            MalformedMetricRecord => "malformed_metric_record",
            DegenerateGeometry => "degenerate_geometry",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for a view, metric or direction that isn't configured.
    Config,
    /// The raw payload is unreadable or inconsistent.
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Data,
            code: ErrorCode::JsonDeserialization,
            details: Some(err.to_string()),
        }
    }
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Config => "ConfigError",
            ErrorKind::Data => "DataError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;
