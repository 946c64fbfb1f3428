//! Runtime edge and join objects.
//!
//! A join's parameters are read-only to every consumer: readers receive
//! copies, never a handle into the join.

use crate::registry::TopologyRegistry;
use crate::types::{EdgeType, JoinType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A typed boundary of a component shape.
///
/// An edge is stored inside the `ComponentSpec` that owns it and does not
/// repeat the owner's name; the owning component is the first half of the
/// edge's `component.edge` reference and is recovered through the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub name: String,
    pub edge_type: EdgeType,
    /// Id of the join this edge takes part in; `None` for unattached edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

impl Edge {
    pub fn new(name: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            name: name.into(),
            edge_type,
            join_ref: None,
        }
    }

    pub fn with_join(mut self, join_ref: impl Into<String>) -> Self {
        self.join_ref = Some(join_ref.into());
        self
    }
}

/// A `component.edge` reference split into its two halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    pub component: &'a str,
    pub edge: &'a str,
}

impl<'a> EdgeRef<'a> {
    /// Split at the first `.`; both halves must be non-empty.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (component, edge) = raw.split_once('.')?;
        if component.is_empty() || edge.is_empty() {
            return None;
        }
        Some(Self { component, edge })
    }
}

/// A connection between exactly two component edges.
///
/// `edge_a_ref` is the upstream side, `edge_b_ref` the downstream side,
/// matching the order of compatibility keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    id: String,
    join_type: JoinType,
    edge_a_ref: String,
    edge_b_ref: String,
    #[serde(default)]
    parameters: BTreeMap<String, Value>,
}

impl Join {
    pub fn new(
        id: impl Into<String>,
        join_type: JoinType,
        edge_a_ref: impl Into<String>,
        edge_b_ref: impl Into<String>,
        parameters: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            join_type,
            edge_a_ref: edge_a_ref.into(),
            edge_b_ref: edge_b_ref.into(),
            parameters,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn edge_a_ref(&self) -> &str {
        &self.edge_a_ref
    }

    pub fn edge_b_ref(&self) -> &str {
        &self.edge_b_ref
    }

    /// Symmetry is a property of the join type, never of the instance.
    pub fn is_symmetric(&self) -> bool {
        self.join_type.is_symmetric()
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }
}

/// A copy of the parameters owned by the join's type. Parameters the type
/// does not own are dropped; absent ones are skipped.
pub fn read_join_parameters(join: &Join) -> BTreeMap<String, Value> {
    join.join_type
        .owned_parameters()
        .iter()
        .filter_map(|name| {
            join.parameters
                .get(*name)
                .map(|value| ((*name).to_string(), value.clone()))
        })
        .collect()
}

/// Registry defaults for the key, overlaid with the join's own parameters.
/// A required parameter the join does not supply stays `null`.
pub fn resolve_join_parameters(
    registry: &TopologyRegistry,
    edge_type_a: EdgeType,
    edge_type_b: EdgeType,
    join: &Join,
) -> BTreeMap<String, Value> {
    let mut params = registry.get_defaults(edge_type_a, edge_type_b, join.join_type);
    params.extend(read_join_parameters(join));
    params
}
