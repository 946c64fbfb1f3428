//! Component instruction sequences (IR).
//!
//! Operations are parameterized, never flattened to one record per row: a
//! `WORK_EVEN` of 40 rows is one operation. The IR is produced upstream and
//! consumed read-only by the checker and the writer.

use crate::error::SchemaError;
use crate::manifest::Handedness;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skyknit_kernel::ShapingInterval;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpType {
    CastOn,
    WorkEven,
    IncreaseSection,
    DecreaseSection,
    Separate,
    Taper,
    BindOff,
    Hold,
    PickupStitches,
}

impl OpType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CastOn => "CAST_ON",
            Self::WorkEven => "WORK_EVEN",
            Self::IncreaseSection => "INCREASE_SECTION",
            Self::DecreaseSection => "DECREASE_SECTION",
            Self::Separate => "SEPARATE",
            Self::Taper => "TAPER",
            Self::BindOff => "BIND_OFF",
            Self::Hold => "HOLD",
            Self::PickupStitches => "PICKUP_STITCHES",
        }
    }

    /// Operations that establish the starting live count from nothing.
    pub fn starts_component(self) -> bool {
        matches!(self, Self::CastOn | Self::PickupStitches)
    }
}

impl std::fmt::Display for OpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parameterized knitting operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub op_type: OpType,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    /// Rows consumed, when the operation spans rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,
    /// Declared live count after the operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stitch_count_after: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Operation {
    pub fn new(op_type: OpType) -> Self {
        Self {
            op_type,
            parameters: BTreeMap::new(),
            row_count: None,
            stitch_count_after: None,
            notes: String::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn with_rows(mut self, row_count: u32) -> Self {
        self.row_count = Some(row_count);
        self
    }

    pub fn with_stitch_count_after(mut self, count: u32) -> Self {
        self.stitch_count_after = Some(count);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn cast_on(count: u32) -> Self {
        Self::new(OpType::CastOn)
            .with_param("count", count)
            .with_stitch_count_after(count)
    }

    pub fn work_even(row_count: u32, stitch_count: u32) -> Self {
        Self::new(OpType::WorkEven)
            .with_rows(row_count)
            .with_stitch_count_after(stitch_count)
    }

    /// Bind off `count` stitches, or every live stitch when `None`.
    pub fn bind_off(count: Option<u32>) -> Self {
        let op = Self::new(OpType::BindOff);
        match count {
            Some(count) => op.with_param("count", count),
            None => op.with_stitch_count_after(0),
        }
    }

    pub fn hold(label: &str, count: u32) -> Self {
        Self::new(OpType::Hold)
            .with_param("label", label)
            .with_param("count", count)
    }

    /// Split the live stitches into named groups and keep working
    /// `active_group`; the other groups go on hold under their own labels.
    pub fn separate(groups: &[(&str, u32)], active_group: &str) -> Self {
        let groups: serde_json::Map<String, Value> = groups
            .iter()
            .map(|(label, count)| ((*label).to_string(), Value::from(*count)))
            .collect();
        Self::new(OpType::Separate)
            .with_param("groups", Value::Object(groups))
            .with_param("active_group", active_group)
    }

    /// Pick up `count` stitches, optionally resuming a held group.
    pub fn pickup(count: u32, source: Option<&str>) -> Self {
        let op = Self::new(OpType::PickupStitches).with_param("count", count);
        match source {
            Some(label) => op.with_param("source", label),
            None => op,
        }
    }

    /// An increase or decrease section ending at `stitch_count_after`.
    pub fn shaping(op_type: OpType, row_count: u32, stitch_count_after: u32) -> Self {
        Self::new(op_type)
            .with_rows(row_count)
            .with_stitch_count_after(stitch_count_after)
    }

    pub fn with_intervals(self, intervals: &[ShapingInterval]) -> Self {
        let value = serde_json::to_value(intervals).unwrap_or(Value::Null);
        self.with_param("intervals", value)
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// A non-negative integer parameter. `Ok(None)` when absent.
    pub fn count_param(&self, name: &str) -> Result<Option<u32>, String> {
        let Some(value) = self.parameters.get(name) else {
            return Ok(None);
        };
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| format!("parameter `{name}` must be a non-negative integer, got {value}"))
    }

    /// A signed integer parameter. `Ok(None)` when absent.
    pub fn signed_param(&self, name: &str) -> Result<Option<i64>, String> {
        let Some(value) = self.parameters.get(name) else {
            return Ok(None);
        };
        value
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("parameter `{name}` must be an integer, got {value}"))
    }

    pub fn str_param(&self, name: &str) -> Result<Option<&str>, String> {
        let Some(value) = self.parameters.get(name) else {
            return Ok(None);
        };
        value
            .as_str()
            .map(Some)
            .ok_or_else(|| format!("parameter `{name}` must be a string, got {value}"))
    }

    /// `groups` as label → count, in label order.
    pub fn groups_param(&self) -> Result<Option<BTreeMap<String, u32>>, String> {
        let Some(value) = self.parameters.get("groups") else {
            return Ok(None);
        };
        let Some(object) = value.as_object() else {
            return Err(format!("parameter `groups` must be an object, got {value}"));
        };
        let mut groups = BTreeMap::new();
        for (label, count) in object {
            let count = count
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| format!("group `{label}` must have a non-negative count, got {count}"))?;
            groups.insert(label.clone(), count);
        }
        Ok(Some(groups))
    }

    pub fn intervals_param(&self) -> Result<Option<Vec<ShapingInterval>>, String> {
        let Some(value) = self.parameters.get("intervals") else {
            return Ok(None);
        };
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|err| format!("parameter `intervals` is malformed: {err}"))
    }
}

/// The complete instruction sequence of one component.
///
/// Deserialization goes through the same check as [`ComponentIR::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComponentIR", rename_all = "camelCase")]
pub struct ComponentIR {
    /// Matches a `ComponentSpec` name in the manifest.
    pub component_name: String,
    #[serde(default)]
    pub handedness: Handedness,
    pub operations: Vec<Operation>,
    /// Live count once the component is established.
    pub starting_stitch_count: u32,
    /// Expected live count after the last operation.
    pub ending_stitch_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComponentIR {
    component_name: String,
    #[serde(default)]
    handedness: Handedness,
    operations: Vec<Operation>,
    starting_stitch_count: u32,
    ending_stitch_count: u32,
}

impl TryFrom<RawComponentIR> for ComponentIR {
    type Error = SchemaError;

    fn try_from(raw: RawComponentIR) -> Result<Self, Self::Error> {
        ComponentIR::new(
            raw.component_name,
            raw.handedness,
            raw.operations,
            raw.starting_stitch_count,
            raw.ending_stitch_count,
        )
    }
}

impl ComponentIR {
    pub fn new(
        component_name: impl Into<String>,
        handedness: Handedness,
        operations: Vec<Operation>,
        starting_stitch_count: u32,
        ending_stitch_count: u32,
    ) -> Result<Self, SchemaError> {
        let ir = Self {
            component_name: component_name.into(),
            handedness,
            operations,
            starting_stitch_count,
            ending_stitch_count,
        };
        ir.validate()?;
        Ok(ir)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.component_name.trim().is_empty() {
            return Err(SchemaError::EmptyName { what: "component" });
        }
        Ok(())
    }

    /// Sum of declared row counts.
    pub fn total_rows(&self) -> u64 {
        self.operations
            .iter()
            .filter_map(|op| op.row_count)
            .map(u64::from)
            .sum()
    }
}
