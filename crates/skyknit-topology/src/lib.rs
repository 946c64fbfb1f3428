//! # Skyknit Topology
//!
//! The typed vocabulary of garment construction and the lookup tables that
//! govern it. Tables are versioned TOML files, loaded and cross-checked once;
//! a structural problem aborts loading with every issue listed. After load
//! the registry is immutable and shared freely between threads.
//!
//! ```text
//! data/*.toml ──parse──▶ raw rows ──cross-reference──▶ TopologyRegistry
//!                                                        │
//!          get_compatibility / get_condition / get_defaults / get_arithmetic
//!                                                        │
//!                                   Join ──read/resolve──▶ parameters
//! ```

/// Implements `ALL`, `as_str`, `Display` and `FromStr` for a fieldless enum
/// whose identifiers appear verbatim in table files.
macro_rules! vocabulary {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("unknown {} `{}`", stringify!($name), s)),
                }
            }
        }
    };
}

pub mod condition;
pub mod error;
pub mod join;
pub mod registry;
pub mod tables;
pub mod types;

pub use condition::Condition;
pub use error::TopologyError;
pub use join::{Edge, EdgeRef, Join, read_join_parameters, resolve_join_parameters};
pub use registry::{REGISTRY_DIGEST_PREFIX, RegistrySummary, TopologyRegistry};
pub use tables::{TABLE_FILES, TABLE_VERSION, TableSource, TableSources};
pub use types::{
    ArithmeticEntry, ArithmeticImplication, CompatibilityEntry, CompatibilityKey,
    CompatibilityResult, DefaultsEntry, EdgeType, EdgeTypeEntry, JoinType, JoinTypeEntry,
    PhaseConstraint, RenderingMode, WriterDispatchEntry,
};

use std::sync::OnceLock;

static REGISTRY: OnceLock<Result<TopologyRegistry, TopologyError>> = OnceLock::new();

/// The process-wide registry built from the compiled-in tables.
///
/// Loaded on first call and never mutated afterwards. A load failure is
/// returned on every call.
pub fn registry() -> Result<&'static TopologyRegistry, &'static TopologyError> {
    REGISTRY.get_or_init(TopologyRegistry::builtin).as_ref()
}
