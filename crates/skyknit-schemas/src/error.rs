//! Constructor validation errors for the data contracts.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("{what} name must not be empty")]
    EmptyName { what: &'static str },

    #[error("component `{component}`: edge names must be unique, `{edge}` appears twice")]
    DuplicateEdge { component: String, edge: String },

    #[error("component `{component}`: instantiation_count must be >= 1, got {value}")]
    InvalidInstantiationCount { component: String, value: u32 },

    #[error("component `{component}`: dimension `{dimension}` must be a finite non-negative length, got {value}")]
    InvalidDimension {
        component: String,
        dimension: String,
        value: f64,
    },

    #[error("motif `{motif}`: {field} must be >= 1, got {value}")]
    InvalidMotifRepeat {
        motif: String,
        field: &'static str,
        value: u32,
    },

    #[error("needle_size_mm must be positive, got {0}")]
    InvalidNeedleSize(f64),

    #[error("physical_tolerance_mm must be a finite non-negative length, got {0}")]
    InvalidTolerance(f64),

    #[error("hard_constraints values must be >= 1, got {0}")]
    InvalidHardConstraint(u32),
}
