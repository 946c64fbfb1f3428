//! Shape manifest: components, their typed edges, and the joins between them.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use skyknit_topology::{Edge, EdgeRef, Join};
use std::collections::{BTreeMap, BTreeSet};

/// Geometric primitives for top-down garment construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeType {
    Cylinder,
    Trapezoid,
    Rectangle,
}

/// Handedness of one instance of a mirrored component pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    None,
}

/// Deserialization goes through [`ComponentSpec::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComponentSpec", rename_all = "camelCase")]
pub struct ComponentSpec {
    pub name: String,
    pub shape_type: ShapeType,
    /// Physical measurements in millimetres, e.g. `circumference_mm`.
    #[serde(default)]
    pub dimensions: BTreeMap<String, f64>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub handedness: Handedness,
    /// 2 for symmetric pairs such as sleeves.
    #[serde(default = "default_instantiation_count")]
    pub instantiation_count: u32,
}

fn default_instantiation_count() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComponentSpec {
    name: String,
    shape_type: ShapeType,
    #[serde(default)]
    dimensions: BTreeMap<String, f64>,
    edges: Vec<Edge>,
    #[serde(default)]
    handedness: Handedness,
    #[serde(default = "default_instantiation_count")]
    instantiation_count: u32,
}

impl TryFrom<RawComponentSpec> for ComponentSpec {
    type Error = SchemaError;

    fn try_from(raw: RawComponentSpec) -> Result<Self, Self::Error> {
        let spec = ComponentSpec {
            name: raw.name,
            shape_type: raw.shape_type,
            dimensions: raw.dimensions,
            edges: raw.edges,
            handedness: raw.handedness,
            instantiation_count: raw.instantiation_count,
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl ComponentSpec {
    pub fn new(
        name: impl Into<String>,
        shape_type: ShapeType,
        dimensions: BTreeMap<String, f64>,
        edges: Vec<Edge>,
    ) -> Result<Self, SchemaError> {
        let spec = Self {
            name: name.into(),
            shape_type,
            dimensions,
            edges,
            handedness: Handedness::None,
            instantiation_count: 1,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName { what: "component" });
        }
        if self.instantiation_count < 1 {
            return Err(SchemaError::InvalidInstantiationCount {
                component: self.name.clone(),
                value: self.instantiation_count,
            });
        }
        for (dimension, value) in &self.dimensions {
            if !(value.is_finite() && *value >= 0.0) {
                return Err(SchemaError::InvalidDimension {
                    component: self.name.clone(),
                    dimension: dimension.clone(),
                    value: *value,
                });
            }
        }
        let mut seen = BTreeSet::new();
        for edge in &self.edges {
            if edge.name.trim().is_empty() {
                return Err(SchemaError::EmptyName { what: "edge" });
            }
            if !seen.insert(edge.name.as_str()) {
                return Err(SchemaError::DuplicateEdge {
                    component: self.name.clone(),
                    edge: edge.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn edge(&self, name: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.name == name)
    }
}

/// Every component and every join of one garment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeManifest {
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub joins: Vec<Join>,
}

impl ShapeManifest {
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|spec| spec.name == name)
    }

    pub fn join(&self, id: &str) -> Option<&Join> {
        self.joins.iter().find(|join| join.id() == id)
    }

    /// Resolve a `component.edge` reference.
    pub fn resolve_edge(&self, raw: &str) -> Option<(&ComponentSpec, &Edge)> {
        let edge_ref = EdgeRef::parse(raw)?;
        let spec = self.component(edge_ref.component)?;
        let edge = spec.edge(edge_ref.edge)?;
        Some((spec, edge))
    }

    /// Every edge of every component paired with the component that owns it,
    /// in manifest order.
    pub fn edges(&self) -> impl Iterator<Item = (&ComponentSpec, &Edge)> {
        self.components
            .iter()
            .flat_map(|spec| spec.edges.iter().map(move |edge| (spec, edge)))
    }

    /// The component owning the edge behind a `component.edge` reference.
    pub fn owning_component(&self, raw: &str) -> Option<&ComponentSpec> {
        self.resolve_edge(raw).map(|(spec, _)| spec)
    }
}
