//! Raw table sources and their on-disk row shapes.
//!
//! Rows keep identifiers as strings so that the registry can report every
//! unresolved identifier in one pass instead of stopping at the first parse
//! failure.

use crate::error::TopologyError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// The only table schema version this build understands.
pub const TABLE_VERSION: u32 = 1;

pub const EDGE_TYPES_FILE: &str = "edge_types.toml";
pub const JOIN_TYPES_FILE: &str = "join_types.toml";
pub const COMPATIBILITY_FILE: &str = "compatibility.toml";
pub const DEFAULTS_FILE: &str = "defaults.toml";
pub const ARITHMETIC_FILE: &str = "arithmetic_implications.toml";
pub const WRITER_DISPATCH_FILE: &str = "writer_dispatch.toml";

pub const TABLE_FILES: [&str; 6] = [
    EDGE_TYPES_FILE,
    JOIN_TYPES_FILE,
    COMPATIBILITY_FILE,
    DEFAULTS_FILE,
    ARITHMETIC_FILE,
    WRITER_DISPATCH_FILE,
];

/// Text of one table plus where it came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub path: String,
    pub text: String,
}

impl TableSource {
    fn builtin(file: &str, text: &str) -> Self {
        Self {
            path: format!("<builtin>/{file}"),
            text: text.to_string(),
        }
    }

    fn read(dir: &Path, file: &str) -> Result<Self, TopologyError> {
        let path = dir.join(file);
        let text = std::fs::read_to_string(&path).map_err(|source| TopologyError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            path: path.display().to_string(),
            text,
        })
    }
}

/// All six tables, unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSources {
    pub edge_types: TableSource,
    pub join_types: TableSource,
    pub compatibility: TableSource,
    pub defaults: TableSource,
    pub arithmetic: TableSource,
    pub writer_dispatch: TableSource,
}

impl TableSources {
    /// Tables compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            edge_types: TableSource::builtin(
                EDGE_TYPES_FILE,
                include_str!("../data/edge_types.toml"),
            ),
            join_types: TableSource::builtin(
                JOIN_TYPES_FILE,
                include_str!("../data/join_types.toml"),
            ),
            compatibility: TableSource::builtin(
                COMPATIBILITY_FILE,
                include_str!("../data/compatibility.toml"),
            ),
            defaults: TableSource::builtin(DEFAULTS_FILE, include_str!("../data/defaults.toml")),
            arithmetic: TableSource::builtin(
                ARITHMETIC_FILE,
                include_str!("../data/arithmetic_implications.toml"),
            ),
            writer_dispatch: TableSource::builtin(
                WRITER_DISPATCH_FILE,
                include_str!("../data/writer_dispatch.toml"),
            ),
        }
    }

    /// Read every table from `dir`. A missing file is an error.
    pub fn from_dir(dir: &Path) -> Result<Self, TopologyError> {
        Ok(Self {
            edge_types: TableSource::read(dir, EDGE_TYPES_FILE)?,
            join_types: TableSource::read(dir, JOIN_TYPES_FILE)?,
            compatibility: TableSource::read(dir, COMPATIBILITY_FILE)?,
            defaults: TableSource::read(dir, DEFAULTS_FILE)?,
            arithmetic: TableSource::read(dir, ARITHMETIC_FILE)?,
            writer_dispatch: TableSource::read(dir, WRITER_DISPATCH_FILE)?,
        })
    }

    /// `(file name, source)` pairs in canonical table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TableSource)> {
        TABLE_FILES.into_iter().zip([
            &self.edge_types,
            &self.join_types,
            &self.compatibility,
            &self.defaults,
            &self.arithmetic,
            &self.writer_dispatch,
        ])
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawTable<T> {
    pub version: u32,
    #[serde(default = "Vec::new")]
    pub entries: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawEdgeType {
    pub id: String,
    pub description: String,
    pub has_live_stitches: bool,
    pub is_terminal: bool,
    pub phase_constraint: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawJoinType {
    pub id: String,
    pub description: String,
    pub symmetric: bool,
    pub directional: bool,
    #[serde(default)]
    pub owns_parameters: Vec<String>,
    #[serde(default)]
    pub construction_methods: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawCompatibility {
    pub edge_type_a: String,
    pub edge_type_b: String,
    pub join_type: String,
    pub result: String,
    pub condition: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawDefaults {
    pub edge_type_a: String,
    pub edge_type_b: String,
    pub join_type: String,
    #[serde(default)]
    pub defaults: BTreeMap<String, Value>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawArithmetic {
    pub join_type: String,
    pub implication: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawWriterDispatch {
    pub join_type: String,
    pub rendering_mode: String,
    pub template_key: String,
    pub directionality_note: bool,
    pub conditional_template_key: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Parse one table and check its version.
pub(crate) fn parse_table<T: DeserializeOwned>(
    source: &TableSource,
) -> Result<RawTable<T>, TopologyError> {
    let table: RawTable<T> =
        toml::from_str(&source.text).map_err(|source_err| TopologyError::ParseToml {
            path: source.path.clone(),
            source: source_err,
        })?;
    if table.version != TABLE_VERSION {
        return Err(TopologyError::UnsupportedVersion {
            path: source.path.clone(),
            found: table.version,
            supported: TABLE_VERSION,
        });
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_parse_at_supported_version() {
        let sources = TableSources::builtin();
        let edge_types: RawTable<RawEdgeType> = parse_table(&sources.edge_types).unwrap();
        assert_eq!(edge_types.entries.len(), 5);
        let defaults: RawTable<RawDefaults> = parse_table(&sources.defaults).unwrap();
        let cast_on_join = defaults
            .entries
            .iter()
            .find(|row| row.join_type == "CAST_ON_JOIN")
            .unwrap();
        assert_eq!(cast_on_join.required, vec!["cast_on_count".to_string()]);
        assert_eq!(
            cast_on_join.defaults.get("cast_on_method"),
            Some(&Value::String("backward_loop".to_string()))
        );
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let source = TableSource {
            path: "mem/arithmetic_implications.toml".to_string(),
            text: "version = 2\nentries = []\n".to_string(),
        };
        let err = parse_table::<RawArithmetic>(&source).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::UnsupportedVersion {
                found: 2,
                supported: 1,
                ..
            }
        ));
    }

    #[test]
    fn unknown_fields_are_parse_errors() {
        let source = TableSource {
            path: "mem/arithmetic_implications.toml".to_string(),
            text: "version = 1\n[[entries]]\njoin_type = \"SEAM\"\nimplication = \"STRUCTURAL\"\nweight = 3\n"
                .to_string(),
        };
        assert!(matches!(
            parse_table::<RawArithmetic>(&source),
            Err(TopologyError::ParseToml { .. })
        ));
    }
}
