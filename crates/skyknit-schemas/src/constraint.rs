//! Per-component knitting constraints: gauge, motif, divisibility, yarn and
//! physical tolerance.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use skyknit_kernel::{Gauge, KernelError, select_stitch_count_from_physical};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StitchMotif {
    pub name: String,
    pub stitch_repeat: u32,
    pub row_repeat: u32,
}

impl StitchMotif {
    pub fn new(name: impl Into<String>, stitch_repeat: u32, row_repeat: u32) -> Result<Self, SchemaError> {
        let motif = Self {
            name: name.into(),
            stitch_repeat,
            row_repeat,
        };
        motif.validate()?;
        Ok(motif)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        for (field, value) in [("stitch_repeat", self.stitch_repeat), ("row_repeat", self.row_repeat)] {
            if value < 1 {
                return Err(SchemaError::InvalidMotifRepeat {
                    motif: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YarnSpec {
    pub weight: String,
    pub fiber: String,
    pub needle_size_mm: f64,
}

impl YarnSpec {
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !(self.needle_size_mm.is_finite() && self.needle_size_mm > 0.0) {
            return Err(SchemaError::InvalidNeedleSize(self.needle_size_mm));
        }
        Ok(())
    }
}

/// Deserialization goes through the same check as [`ConstraintObject::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConstraintObject", rename_all = "camelCase")]
pub struct ConstraintObject {
    pub gauge: Gauge,
    pub stitch_motif: StitchMotif,
    /// Extra divisors every stitch count must satisfy.
    #[serde(default)]
    pub hard_constraints: Vec<u32>,
    pub yarn_spec: YarnSpec,
    pub physical_tolerance_mm: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConstraintObject {
    gauge: Gauge,
    stitch_motif: StitchMotif,
    #[serde(default)]
    hard_constraints: Vec<u32>,
    yarn_spec: YarnSpec,
    physical_tolerance_mm: f64,
}

impl TryFrom<RawConstraintObject> for ConstraintObject {
    type Error = SchemaError;

    fn try_from(raw: RawConstraintObject) -> Result<Self, Self::Error> {
        ConstraintObject::new(
            raw.gauge,
            raw.stitch_motif,
            raw.hard_constraints,
            raw.yarn_spec,
            raw.physical_tolerance_mm,
        )
    }
}

impl ConstraintObject {
    pub fn new(
        gauge: Gauge,
        stitch_motif: StitchMotif,
        hard_constraints: Vec<u32>,
        yarn_spec: YarnSpec,
        physical_tolerance_mm: f64,
    ) -> Result<Self, SchemaError> {
        let constraint = Self {
            gauge,
            stitch_motif,
            hard_constraints,
            yarn_spec,
            physical_tolerance_mm,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        self.stitch_motif.validate()?;
        self.yarn_spec.validate()?;
        if let Some(bad) = self.hard_constraints.iter().find(|c| **c < 1) {
            return Err(SchemaError::InvalidHardConstraint(*bad));
        }
        if !(self.physical_tolerance_mm.is_finite() && self.physical_tolerance_mm >= 0.0) {
            return Err(SchemaError::InvalidTolerance(self.physical_tolerance_mm));
        }
        Ok(())
    }

    /// Stitch count for `length_mm` under this component's motif, hard
    /// constraints and tolerance. `Ok(None)` means escalation is required.
    pub fn select_stitch_count(&self, length_mm: f64) -> Result<Option<u32>, KernelError> {
        select_stitch_count_from_physical(
            length_mm,
            &self.gauge,
            self.physical_tolerance_mm,
            self.stitch_motif.stitch_repeat,
            &self.hard_constraints,
        )
    }
}
