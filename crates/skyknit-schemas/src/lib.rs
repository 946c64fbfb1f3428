//! # Skyknit Schemas
//!
//! The data contracts the core consumes: component instruction sequences,
//! the shape manifest, and per-component constraints. All types serialize
//! as camelCase JSON; vocabulary values keep their table identifiers.

pub mod constraint;
pub mod error;
pub mod ir;
pub mod manifest;

pub use constraint::{ConstraintObject, StitchMotif, YarnSpec};
pub use error::SchemaError;
pub use ir::{ComponentIR, OpType, Operation};
pub use manifest::{ComponentSpec, Handedness, ShapeManifest, ShapeType};
