/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Serializable types for workflow persistence.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::graph::{ConfigValue, StepKind};

/// Document format version written on save. Unknown versions are tolerated
/// on load (no migration), with a warning.
pub const FORMAT_VERSION: &str = "1.0";

/// Persisted step node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersistedNode {
    /// Stable node identity.
    pub node_id: String,
    pub kind: StepKind,
    pub label: String,
    pub position_x: f32,
    pub position_y: f32,
    /// Absent in older documents; the kind's defaults apply then.
    #[serde(default)]
    pub config: BTreeMap<String, ConfigValue>,
}

/// Persisted edge.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersistedEdge {
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
}

/// Full workflow document: node/edge arrays plus capture metadata.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowDocument {
    pub version: String,
    /// Capture time, RFC 3339.
    pub timestamp: String,
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
}

impl WorkflowDocument {
    /// Build a document stamped with the current time.
    pub fn new(nodes: Vec<PersistedNode>, edges: Vec<PersistedEdge>) -> Self {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            version: FORMAT_VERSION.to_string(),
            timestamp,
            nodes,
            edges,
        }
    }

    /// Warn (but do not fail) when the version is not the one we write.
    pub fn check_version(&self) {
        if self.version != FORMAT_VERSION {
            warn!(
                "Workflow document version {:?} differs from {:?}; loading as-is",
                self.version, FORMAT_VERSION
            );
        }
    }
}
