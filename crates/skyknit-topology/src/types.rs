//! Canonical topology vocabulary and the frozen table entry types.
//!
//! Enums are closed: adding a variant is a compile error at every exhaustive
//! `match` that dispatches on it. Their string forms are the identifiers used
//! in the lookup tables and in manifest JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    CastOn,
    LiveStitch,
    BoundOff,
    Selvedge,
    Open,
}

vocabulary!(EdgeType {
    CastOn => "CAST_ON",
    LiveStitch => "LIVE_STITCH",
    BoundOff => "BOUND_OFF",
    Selvedge => "SELVEDGE",
    Open => "OPEN",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinType {
    Continuation,
    HeldStitch,
    CastOnJoin,
    Pickup,
    Seam,
}

vocabulary!(JoinType {
    Continuation => "CONTINUATION",
    HeldStitch => "HELD_STITCH",
    CastOnJoin => "CAST_ON_JOIN",
    Pickup => "PICKUP",
    Seam => "SEAM",
});

impl JoinType {
    /// Parameters a join of this type owns. The join_types table must agree.
    pub fn owned_parameters(self) -> &'static [&'static str] {
        match self {
            Self::Continuation | Self::HeldStitch => &[],
            Self::CastOnJoin => &["cast_on_count", "cast_on_method"],
            Self::Pickup => &["pickup_ratio", "pickup_direction"],
            Self::Seam => &["seam_method"],
        }
    }

    /// Only seams join two edges without an upstream/downstream distinction.
    pub fn is_symmetric(self) -> bool {
        matches!(self, Self::Seam)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityResult {
    Valid,
    Invalid,
    Conditional,
}

vocabulary!(CompatibilityResult {
    Valid => "VALID",
    Invalid => "INVALID",
    Conditional => "CONDITIONAL",
});

/// How a join type affects the active stitch count at its boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArithmeticImplication {
    /// Count carries over unchanged.
    OneToOne,
    /// New stitches are introduced (`cast_on_count`).
    Additive,
    /// Count derives from the source edge scaled by `pickup_ratio`.
    Ratio,
    /// Two stitch sets are consumed and merged.
    Structural,
}

vocabulary!(ArithmeticImplication {
    OneToOne => "ONE_TO_ONE",
    Additive => "ADDITIVE",
    Ratio => "RATIO",
    Structural => "STRUCTURAL",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderingMode {
    Inline,
    Instruction,
    HeaderNote,
}

vocabulary!(RenderingMode {
    Inline => "inline",
    Instruction => "instruction",
    HeaderNote => "header_note",
});

/// Where in a component's construction an edge may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseConstraint {
    Start,
    End,
    Any,
}

vocabulary!(PhaseConstraint {
    Start => "start",
    End => "end",
    Any => "any",
});

/// Ordered compatibility key. `edge_type_a` is always the upstream side, so
/// `(A, B, j)` and `(B, A, j)` are independent keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityKey {
    pub edge_type_a: EdgeType,
    pub edge_type_b: EdgeType,
    pub join_type: JoinType,
}

impl CompatibilityKey {
    pub fn new(edge_type_a: EdgeType, edge_type_b: EdgeType, join_type: JoinType) -> Self {
        Self {
            edge_type_a,
            edge_type_b,
            join_type,
        }
    }
}

impl std::fmt::Display for CompatibilityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.edge_type_a, self.edge_type_b, self.join_type
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeTypeEntry {
    pub id: EdgeType,
    pub description: String,
    pub has_live_stitches: bool,
    pub is_terminal: bool,
    pub phase_constraint: PhaseConstraint,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTypeEntry {
    pub id: JoinType,
    pub description: String,
    pub symmetric: bool,
    pub directional: bool,
    pub owns_parameters: Vec<String>,
    pub construction_methods: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityEntry {
    pub key: CompatibilityKey,
    pub result: CompatibilityResult,
    /// Set only when `result` is `Conditional`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<crate::condition::Condition>,
}

/// Default parameters for one compatibility key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsEntry {
    pub key: CompatibilityKey,
    pub defaults: BTreeMap<String, Value>,
    /// Owned parameters with no default; the join itself must supply them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArithmeticEntry {
    pub join_type: JoinType,
    pub implication: ArithmeticImplication,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriterDispatchEntry {
    pub join_type: JoinType,
    pub rendering_mode: RenderingMode,
    pub template_key: String,
    pub directionality_note: bool,
    /// Used when the compatibility result is `Conditional`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_template_key: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}
