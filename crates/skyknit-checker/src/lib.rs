//! # Skyknit Checker
//!
//! Verifies the stitch arithmetic of a garment's instruction sequences
//! before any prose is written.
//!
//! ## Architecture
//!
//! ```text
//! ComponentIR ──► simulate_component ──► SimulationResult
//!   (per component,   │ execute_op over VmState
//!    in parallel)     ▼
//!                 edge counts  ("component.edge" → stitches)
//!                     │
//! ShapeManifest ──► validate_join per join  ◄── TopologyRegistry
//!                     │                          (arithmetic, defaults,
//!                     ▼                           conditions)
//!                 CheckerResult { passed, errors }
//! ```
//!
//! Every finding is a [`CheckerError`] tagged `filler_origin` (an arithmetic
//! slip in the IR) or `geometric_origin` (dimensions that cannot meet).
//! Findings are collected, never raised: one run reports everything.
//!
//! [`validate_manifest`] is the earlier, IR-free pass over topology alone.

pub mod checker;
pub mod error;
pub mod joins;
pub mod simulate;
pub mod validator;
pub mod vm;

pub use checker::{CheckBundle, CheckerResult, check_all};
pub use error::{CheckerError, ErrorType, TransitionError};
pub use joins::validate_join;
pub use simulate::{SimulationResult, edge_counts_from, extract_edge_counts, simulate_component};
pub use validator::{Severity, ValidationIssue, ValidationResult, validate_manifest};
pub use vm::{VmState, execute_op};
