use serde::{Deserialize, Serialize};
use skyknit_schemas::OpType;
use thiserror::Error;

/// Where a failure should be routed for repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Arithmetic slip inside the instruction sequence.
    FillerOrigin,
    /// Incompatible physical dimensions between components.
    GeometricOrigin,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FillerOrigin => write!(f, "filler_origin"),
            Self::GeometricOrigin => write!(f, "geometric_origin"),
        }
    }
}

/// One collected checker finding. Findings are data: they accumulate in a
/// result and are never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerError {
    pub component_name: String,
    /// Index into the component's operations; `None` for component- or
    /// join-level findings.
    pub operation_index: Option<usize>,
    pub message: String,
    pub error_type: ErrorType,
}

impl CheckerError {
    pub fn filler(
        component_name: impl Into<String>,
        operation_index: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            operation_index,
            message: message.into(),
            error_type: ErrorType::FillerOrigin,
        }
    }

    pub fn geometric(
        component_name: impl Into<String>,
        operation_index: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            operation_index,
            message: message.into(),
            error_type: ErrorType::GeometricOrigin,
        }
    }
}

impl std::fmt::Display for CheckerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operation_index {
            Some(index) => write!(
                f,
                "[{}] {} op {}: {}",
                self.error_type, self.component_name, index, self.message
            ),
            None => write!(
                f,
                "[{}] {}: {}",
                self.error_type, self.component_name, self.message
            ),
        }
    }
}

/// Why a single VM transition was refused. The state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{op_type} before any CAST_ON")]
    NotStarted { op_type: OpType },

    #[error("CAST_ON is only valid as the first operation")]
    CastOnNotFirst,

    #[error("{op_type} requires parameter `{parameter}`")]
    MissingParameter {
        op_type: OpType,
        parameter: &'static str,
    },

    #[error("{op_type}: {message}")]
    InvalidParameter { op_type: OpType, message: String },

    #[error("{op_type} requires a positive row_count")]
    MissingRows { op_type: OpType },

    #[error("{op_type} count must be positive")]
    ZeroCount { op_type: OpType },

    #[error("{op_type} would drive the live count from {live} below zero (delta {delta})")]
    NegativeCount {
        op_type: OpType,
        live: u32,
        delta: i64,
    },

    #[error("{op_type} must {direction} the live count, but goes from {before} to {after}")]
    WrongDirection {
        op_type: OpType,
        direction: &'static str,
        before: u32,
        after: u32,
    },

    #[error("{op_type} of {requested} exceeds the {available} {what} stitches")]
    Exceeds {
        op_type: OpType,
        what: &'static str,
        requested: u32,
        available: u32,
    },

    #[error("BIND_OFF with no live stitches")]
    NothingToBindOff,

    #[error("SEPARATE groups sum to {total}, but {live} stitches are live")]
    GroupMismatch { total: u64, live: u32 },

    #[error("SEPARATE active group `{active}` is not one of the groups")]
    UnknownActiveGroup { active: String },

    #[error("{op_type} overflows the live count")]
    Overflow { op_type: OpType },
}
